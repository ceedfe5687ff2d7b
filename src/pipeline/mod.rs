//! Two-stage migration pipeline
//!
//! `SourceBundle → MigrationPlan → SchemaSuggestion → Report`, strictly
//! sequential. Each stage owns its artifact until it is handed forward.

pub mod analysis;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod schema;
pub mod stage;
pub mod state;

pub use analysis::AnalysisStage;
pub use artifacts::{MigrationPlan, SchemaSuggestion};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use orchestrator::PipelineOrchestrator;
pub use report::{PersistError, Report};
pub use schema::SchemaStage;
pub use stage::StageError;
pub use state::{PipelineStage, PipelineState};
