//! Progress handler trait and events

use crate::pipeline::PipelineStage;
use std::time::Duration;

/// Events emitted while the pipeline runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Pipeline started on a bundle
    Started { bundle_chars: usize },

    /// A stage began
    StageStarted { stage: PipelineStage },

    /// A stage finished and handed its artifact forward
    StageCompleted {
        stage: PipelineStage,
        duration: Duration,
        output_chars: usize,
    },

    /// A stage failed; nothing downstream runs
    StageFailed {
        stage: PipelineStage,
        kind: String,
        retriable: bool,
    },

    /// Report assembled
    Completed { total_time: Duration },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
