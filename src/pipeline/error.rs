use super::stage::StageError;
use super::state::PipelineStage;
use crate::ingest::IngestError;
use thiserror::Error;

/// A run ended without a report
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Ingesting failed (IngestionError): {0}")]
    Ingestion(#[from] IngestError),

    #[error("{stage} failed ({kind}): {error}", kind = .error.kind())]
    Failed {
        stage: PipelineStage,
        #[source]
        error: StageError,
    },

    #[error("Cancelled while {stage}")]
    Cancelled { stage: PipelineStage },
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Ingestion(_) => PipelineStage::Ingesting,
            PipelineError::Failed { stage, .. } | PipelineError::Cancelled { stage } => *stage,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Ingestion(_) => "IngestionError",
            PipelineError::Failed { error, .. } => error.kind(),
            PipelineError::Cancelled { .. } => "Cancelled",
        }
    }

    pub fn is_retriable(&self) -> bool {
        match self {
            PipelineError::Failed { error, .. } => error.is_retriable(),
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;

    #[test]
    fn test_failed_names_stage_and_kind() {
        let err = PipelineError::Failed {
            stage: PipelineStage::Analyzing,
            error: GenerationError::from_status(429, "slow down", None).into(),
        };
        assert_eq!(err.stage(), PipelineStage::Analyzing);
        assert_eq!(err.kind(), "RateLimited");
        assert!(err.is_retriable());

        let message = err.to_string();
        assert!(message.starts_with("Analyzing failed (RateLimited)"));
        assert!(message.contains("slow down"));
    }

    #[test]
    fn test_ingestion_and_cancel() {
        let err = PipelineError::from(IngestError::EmptyBundle);
        assert_eq!(err.stage(), PipelineStage::Ingesting);
        assert_eq!(err.kind(), "IngestionError");
        assert!(!err.is_retriable());

        let err = PipelineError::Cancelled {
            stage: PipelineStage::SuggestingSchema,
        };
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "Cancelled while SuggestingSchema");
    }
}
