//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { bundle_chars } => {
                info!(bundle_chars, "Starting migration analysis");
            }
            ProgressEvent::StageStarted { stage } => {
                info!(stage = %stage, "Starting stage");
            }
            ProgressEvent::StageCompleted {
                stage,
                duration,
                output_chars,
            } => {
                info!(
                    stage = %stage,
                    duration_ms = duration.as_millis(),
                    output_chars,
                    "Stage complete"
                );
            }
            ProgressEvent::StageFailed {
                stage,
                kind,
                retriable,
            } => {
                warn!(stage = %stage, kind = %kind, retriable, "Stage failed");
            }
            ProgressEvent::Completed { total_time } => {
                info!(
                    total_time_ms = total_time.as_millis(),
                    "Migration report assembled"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineStage;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::Started { bundle_chars: 42 },
            ProgressEvent::StageStarted {
                stage: PipelineStage::Analyzing,
            },
            ProgressEvent::StageCompleted {
                stage: PipelineStage::Analyzing,
                duration: Duration::from_millis(100),
                output_chars: 7,
            },
            ProgressEvent::StageFailed {
                stage: PipelineStage::SuggestingSchema,
                kind: "RateLimited".to_string(),
                retriable: true,
            },
            ProgressEvent::Completed {
                total_time: Duration::from_secs(5),
            },
        ];

        for event in events {
            handler.on_progress(&event);
        }
    }
}
