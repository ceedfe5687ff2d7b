use super::artifacts::MigrationPlan;
use super::config::PipelineConfig;
use super::stage::{generate_for, StageError};
use crate::ingest::SourceBundle;
use crate::llm::GenerationClient;
use crate::prompt::templates::{
    MIGRATION_PLAN_INSTRUCTIONS, MIGRATION_PLAN_SYSTEM, REPOSITORY_LAYOUT_LABEL,
    SOURCE_FILES_LABEL,
};
use crate::prompt::PromptSpec;
use std::sync::Arc;
use tracing::info;

/// First stage: flattened repository in, migration plan out
pub struct AnalysisStage {
    client: Arc<dyn GenerationClient>,
    config: PipelineConfig,
}

impl AnalysisStage {
    pub fn new(client: Arc<dyn GenerationClient>, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Migration-plan instructions followed by the file contents, then the tree
    pub fn prompt_spec(&self, bundle: &SourceBundle) -> PromptSpec {
        PromptSpec::new(MIGRATION_PLAN_INSTRUCTIONS, self.config.size_limit)
            .with_segment(SOURCE_FILES_LABEL, bundle.content())
            .with_segment(REPOSITORY_LAYOUT_LABEL, bundle.tree())
    }

    /// Makes one generation call; any failure is returned unchanged.
    pub async fn analyze(&self, bundle: &SourceBundle) -> Result<MigrationPlan, StageError> {
        info!(
            client = self.client.name(),
            model = %self.config.model,
            "Requesting migration plan"
        );
        let spec = self.prompt_spec(bundle);
        let text = generate_for(
            self.client.as_ref(),
            &self.config,
            MIGRATION_PLAN_SYSTEM,
            &spec,
        )
        .await?;
        Ok(MigrationPlan::new(text))
    }
}
