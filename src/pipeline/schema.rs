use super::artifacts::{MigrationPlan, SchemaSuggestion};
use super::config::PipelineConfig;
use super::stage::{generate_for, StageError};
use crate::llm::GenerationClient;
use crate::prompt::templates::{MIGRATION_PLAN_LABEL, SCHEMA_INSTRUCTIONS, SCHEMA_SYSTEM};
use crate::prompt::PromptSpec;
use std::sync::Arc;
use tracing::info;

/// Second stage: migration plan in, target schema out.
///
/// The plan is the only input; this stage never sees the repository.
pub struct SchemaStage {
    client: Arc<dyn GenerationClient>,
    config: PipelineConfig,
}

impl SchemaStage {
    pub fn new(client: Arc<dyn GenerationClient>, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    pub fn prompt_spec(&self, plan: &MigrationPlan) -> PromptSpec {
        PromptSpec::new(SCHEMA_INSTRUCTIONS, self.config.size_limit)
            .with_segment(MIGRATION_PLAN_LABEL, plan.as_str())
    }

    pub async fn suggest_schema(&self, plan: &MigrationPlan) -> Result<SchemaSuggestion, StageError> {
        info!(
            client = self.client.name(),
            model = %self.config.model,
            "Requesting schema suggestion"
        );
        let spec = self.prompt_spec(plan);
        let text = generate_for(self.client.as_ref(), &self.config, SCHEMA_SYSTEM, &spec).await?;
        Ok(SchemaSuggestion::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockGenerationClient, MockResponse};

    #[tokio::test]
    async fn test_plan_is_the_only_segment() {
        let client = Arc::new(MockGenerationClient::new());
        client.add_response(MockResponse::text("SCHEMA"));

        let stage = SchemaStage::new(client.clone(), PipelineConfig::default());
        let plan = MigrationPlan::new("Plan: replace JPA with X");
        let schema = stage.suggest_schema(&plan).await.unwrap();

        assert_eq!(schema.as_str(), "SCHEMA");
        let spec = stage.prompt_spec(&plan);
        assert_eq!(spec.segments.len(), 1);
        assert_eq!(spec.segments[0].label, MIGRATION_PLAN_LABEL);

        let request = &client.requests()[0];
        assert!(request.prompt.contains("Plan: replace JPA with X"));
        assert_eq!(request.system.as_deref(), Some(SCHEMA_SYSTEM));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let stage = SchemaStage::new(
            Arc::new(MockGenerationClient::new()),
            PipelineConfig::default(),
        );
        let plan = MigrationPlan::new("plan text");
        assert_eq!(
            stage.prompt_spec(&plan).render().unwrap(),
            stage.prompt_spec(&plan).render().unwrap()
        );
    }
}
