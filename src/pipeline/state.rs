use std::fmt;

/// Steps of a run that can fail or be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Ingesting,
    Analyzing,
    SuggestingSchema,
    Assembling,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Ingesting => "Ingesting",
            PipelineStage::Analyzing => "Analyzing",
            PipelineStage::SuggestingSchema => "SuggestingSchema",
            PipelineStage::Assembling => "Assembling",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a run currently is.
///
/// `Idle → Ingesting → Analyzing → SuggestingSchema → Assembling → Done`.
/// `Failed` is terminal; a new run starts again from `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Ingesting,
    Analyzing,
    SuggestingSchema,
    Assembling,
    Done,
    Failed {
        stage: PipelineStage,
        kind: String,
        retriable: bool,
    },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed { .. })
    }
}

impl From<PipelineStage> for PipelineState {
    fn from(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::Ingesting => PipelineState::Ingesting,
            PipelineStage::Analyzing => PipelineState::Analyzing,
            PipelineStage::SuggestingSchema => PipelineState::SuggestingSchema,
            PipelineStage::Assembling => PipelineState::Assembling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::SuggestingSchema.to_string(), "SuggestingSchema");
        assert_eq!(PipelineState::from(PipelineStage::Analyzing), PipelineState::Analyzing);
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Failed {
            stage: PipelineStage::Analyzing,
            kind: "AuthError".to_string(),
            retriable: false,
        }
        .is_terminal());
        assert!(!PipelineState::Analyzing.is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
    }
}
