use super::config::PipelineConfig;
use crate::llm::{GenerationClient, GenerationError, GenerationRequest};
use crate::prompt::{OversizeError, PromptSpec};
use crate::retry::Retriable;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a single stage produced no artifact
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error(transparent)]
    Oversize(#[from] OversizeError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl StageError {
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::Oversize(_) => "OversizeError",
            StageError::Generation(e) => e.kind().as_str(),
        }
    }

    pub fn is_retriable(&self) -> bool {
        match self {
            StageError::Oversize(_) => false,
            StageError::Generation(e) => e.is_retriable(),
        }
    }
}

impl Retriable for StageError {
    fn is_retriable(&self) -> bool {
        StageError::is_retriable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            StageError::Generation(e) => e.retry_after(),
            StageError::Oversize(_) => None,
        }
    }
}

/// Renders `spec` and makes exactly one generation call with it.
///
/// An oversized prompt fails before the client is touched.
pub(crate) async fn generate_for(
    client: &dyn GenerationClient,
    config: &PipelineConfig,
    system: &str,
    spec: &PromptSpec,
) -> Result<String, StageError> {
    let prompt = spec.render()?;
    debug!(
        prompt_chars = prompt.chars().count(),
        limit = spec.size_limit,
        "Prompt rendered"
    );

    let mut request = GenerationRequest::new(config.model.clone(), prompt).with_system(system);
    if let Some(temperature) = config.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = config.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    let response = client.generate(request).await?;
    debug!(
        response_chars = response.text.chars().count(),
        response_time_ms = response.response_time.as_millis() as u64,
        "Generation complete"
    );
    Ok(response.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_retriable() {
        let oversize = StageError::Oversize(OversizeError {
            limit: 10,
            rendered_chars: 20,
            instructions_chars: 5,
            segments: vec![],
        });
        assert_eq!(oversize.kind(), "OversizeError");
        assert!(!oversize.is_retriable());

        let limited: StageError = GenerationError::from_status(429, "slow", None).into();
        assert_eq!(limited.kind(), "RateLimited");
        assert!(limited.is_retriable());
    }
}
