use super::analysis::AnalysisStage;
use super::config::PipelineConfig;
use super::error::PipelineError;
use super::report::Report;
use super::schema::SchemaStage;
use super::stage::StageError;
use super::state::{PipelineStage, PipelineState};
use crate::ingest::{IngestConfig, IngestError, RepositoryFlattener, SourceBundle};
use crate::llm::GenerationClient;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::retry::{retry_stage, RetryPolicy};
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs ingestion, analysis, schema suggestion and assembly in order.
///
/// Each stage starts only after the previous one produced its artifact.
/// Cancellation is checked before ingestion and before each generation
/// stage, and raced against the in-flight call. Assembly always completes.
pub struct PipelineOrchestrator {
    analysis: AnalysisStage,
    schema: SchemaStage,
    progress: Arc<dyn ProgressHandler>,
    cancel: CancellationToken,
    retry: RetryPolicy,
    state: Mutex<PipelineState>,
}

impl PipelineOrchestrator {
    pub fn new(client: Arc<dyn GenerationClient>, config: PipelineConfig) -> Self {
        Self {
            analysis: AnalysisStage::new(client.clone(), config.clone()),
            schema: SchemaStage::new(client, config),
            progress: Arc::new(NoOpHandler),
            cancel: CancellationToken::new(),
            retry: RetryPolicy::default(),
            state: Mutex::new(PipelineState::Idle),
        }
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = handler;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Resubmits a stage on retriable failures. Off unless set.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn set_state(&self, state: PipelineState) {
        debug!(?state, "Pipeline state");
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    fn fail(&self, error: PipelineError) -> PipelineError {
        let stage = error.stage();
        self.progress.on_progress(&ProgressEvent::StageFailed {
            stage,
            kind: error.kind().to_string(),
            retriable: error.is_retriable(),
        });
        self.set_state(PipelineState::Failed {
            stage,
            kind: error.kind().to_string(),
            retriable: error.is_retriable(),
        });
        error
    }

    /// Flattens `repo_path` and runs the pipeline on the result.
    pub async fn execute_path(
        &self,
        repo_path: PathBuf,
        ingest_config: IngestConfig,
    ) -> Result<Report, PipelineError> {
        self.set_state(PipelineState::Ingesting);
        if self.cancel.is_cancelled() {
            return Err(self.fail(PipelineError::Cancelled {
                stage: PipelineStage::Ingesting,
            }));
        }

        self.progress.on_progress(&ProgressEvent::StageStarted {
            stage: PipelineStage::Ingesting,
        });
        let start = Instant::now();

        let flattened = RepositoryFlattener::new(repo_path)
            .map(|f| f.with_config(ingest_config))
            .and_then(|f| f.flatten());
        let (bundle, summary) = match flattened {
            Ok(result) => result,
            Err(e) => return Err(self.fail(PipelineError::Ingestion(e))),
        };

        info!("{}", summary);
        self.progress.on_progress(&ProgressEvent::StageCompleted {
            stage: PipelineStage::Ingesting,
            duration: start.elapsed(),
            output_chars: bundle.content().chars().count(),
        });

        self.run(&bundle).await
    }

    /// Runs the pipeline on a bundle produced outside the flattener, such as
    /// [`SourceBundle::load`]. A load failure ends the run in `Ingesting`.
    pub async fn execute_loaded(
        &self,
        loaded: Result<SourceBundle, IngestError>,
    ) -> Result<Report, PipelineError> {
        self.set_state(PipelineState::Ingesting);
        if self.cancel.is_cancelled() {
            return Err(self.fail(PipelineError::Cancelled {
                stage: PipelineStage::Ingesting,
            }));
        }

        match loaded {
            Ok(bundle) => self.run(&bundle).await,
            Err(e) => Err(self.fail(PipelineError::Ingestion(e))),
        }
    }

    /// Runs both stages on an existing bundle and assembles the report.
    ///
    /// The report is returned, not written; persisting is up to the caller.
    pub async fn execute(&self, bundle: &SourceBundle) -> Result<Report, PipelineError> {
        self.set_state(PipelineState::Idle);
        self.run(bundle).await
    }

    async fn run(&self, bundle: &SourceBundle) -> Result<Report, PipelineError> {
        let start = Instant::now();
        self.progress.on_progress(&ProgressEvent::Started {
            bundle_chars: bundle.content().chars().count() + bundle.tree().chars().count(),
        });

        let analysis = &self.analysis;
        let plan = self
            .run_stage(PipelineStage::Analyzing, move |attempt| {
                if attempt > 1 {
                    info!(attempt, "Resubmitting analysis");
                }
                analysis.analyze(bundle)
            })
            .await?;

        let schema_stage = &self.schema;
        let plan_ref = &plan;
        let schema = self
            .run_stage(PipelineStage::SuggestingSchema, move |attempt| {
                if attempt > 1 {
                    info!(attempt, "Resubmitting schema suggestion");
                }
                schema_stage.suggest_schema(plan_ref)
            })
            .await?;

        // Assembly is local; a cancel arriving now no longer stops the run.
        self.set_state(PipelineState::Assembling);
        let report = Report::assemble(plan, schema);

        self.set_state(PipelineState::Done);
        self.progress.on_progress(&ProgressEvent::Completed {
            total_time: start.elapsed(),
        });
        Ok(report)
    }

    async fn run_stage<T, F, Fut>(&self, stage: PipelineStage, op: F) -> Result<T, PipelineError>
    where
        T: ArtifactText,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, StageError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(self.fail(PipelineError::Cancelled { stage }));
        }

        self.set_state(stage.into());
        self.progress
            .on_progress(&ProgressEvent::StageStarted { stage });
        let start = Instant::now();

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(stage = %stage, "Cancelled during generation");
                return Err(self.fail(PipelineError::Cancelled { stage }));
            }
            result = retry_stage(&self.retry, &self.cancel, op) => result,
        };

        match result {
            Ok(artifact) => {
                self.progress.on_progress(&ProgressEvent::StageCompleted {
                    stage,
                    duration: start.elapsed(),
                    output_chars: artifact.text().chars().count(),
                });
                Ok(artifact)
            }
            Err(_) if self.cancel.is_cancelled() => {
                Err(self.fail(PipelineError::Cancelled { stage }))
            }
            Err(error) => Err(self.fail(PipelineError::Failed { stage, error })),
        }
    }
}

/// Stage outputs expose their text for progress reporting
trait ArtifactText {
    fn text(&self) -> &str;
}

impl ArtifactText for super::MigrationPlan {
    fn text(&self) -> &str {
        self.as_str()
    }
}

impl ArtifactText for super::SchemaSuggestion {
    fn text(&self) -> &str {
        self.as_str()
    }
}
