//! migration-planner - LLM-driven migration reports for source repositories
//!
//! This library flattens a repository into a single text bundle, asks a
//! language model for a migration plan, then asks it again for a target
//! datastore schema derived from that plan, and writes both into one report.
//!
//! # Core Concepts
//!
//! - **Source bundle**: the flattened repository (file contents + tree listing)
//! - **Stages**: the analysis stage produces a [`MigrationPlan`] from the bundle;
//!   the schema stage produces a [`SchemaSuggestion`] from the plan alone
//! - **Generation clients**: pluggable model backends behind [`GenerationClient`]
//! - **Report**: both artifacts under fixed headings, persisted by overwrite
//!
//! # Example Usage
//!
//! ```ignore
//! use migration_planner::{PipelineOrchestrator, PipelineConfig, RepositoryFlattener};
//! use std::sync::Arc;
//!
//! async fn run(client: Arc<dyn migration_planner::GenerationClient>) -> anyhow::Result<()> {
//!     let (bundle, _summary) = RepositoryFlattener::new("code/kitchensink".into())?.flatten()?;
//!     let orchestrator = PipelineOrchestrator::new(client, PipelineConfig::default());
//!     let report = orchestrator.execute(&bundle).await?;
//!     report.persist("Migration_Plan.md")?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod retry;
pub mod util;

pub use config::{ConfigError, PlannerConfig};
pub use ingest::{IngestConfig, IngestError, IngestSummary, RepositoryFlattener, SourceBundle};
pub use llm::{
    ApiKey, FailureKind, GenAIClient, GenerationClient, GenerationError, GenerationRequest,
    GenerationResult, MockGenerationClient, OpenAIClient,
};
pub use pipeline::{
    MigrationPlan, PersistError, PipelineConfig, PipelineError, PipelineOrchestrator,
    PipelineStage, PipelineState, Report, SchemaSuggestion, StageError,
};
pub use prompt::{OversizeError, PromptBuilder, PromptSpec};
pub use retry::RetryPolicy;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_migration_planner() {
        assert_eq!(NAME, "migration-planner");
    }
}
