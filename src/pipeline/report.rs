use super::artifacts::{MigrationPlan, SchemaSuggestion};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Writing the report failed. The `Report` itself is untouched and can be
/// persisted again.
#[derive(Debug, Error)]
#[error("Failed to write report to {}: {source}", .path.display())]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Both stage outputs under fixed headings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    migration_plan: MigrationPlan,
    schema_suggestion: SchemaSuggestion,
}

impl Report {
    pub fn assemble(migration_plan: MigrationPlan, schema_suggestion: SchemaSuggestion) -> Self {
        Self {
            migration_plan,
            schema_suggestion,
        }
    }

    pub fn migration_plan(&self) -> &MigrationPlan {
        &self.migration_plan
    }

    pub fn schema_suggestion(&self) -> &SchemaSuggestion {
        &self.schema_suggestion
    }

    /// Markdown document with the plan section first, then the schema.
    /// Both texts are inserted verbatim.
    pub fn render(&self) -> String {
        format!(
            "# Migration Report\n\n## Migration Plan\n\n{}\n\n## Suggested Schema\n\n{}\n",
            self.migration_plan, self.schema_suggestion
        )
    }

    /// Replaces `destination` with the rendered report.
    ///
    /// Missing parent directories are created. The text goes to a sibling
    /// temporary file first and is renamed over the destination, so the
    /// destination never holds a partial report.
    pub fn persist(&self, destination: impl AsRef<Path>) -> Result<(), PersistError> {
        let destination = destination.as_ref();
        let fail = |source: io::Error| PersistError {
            path: destination.to_path_buf(),
            source,
        };

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(fail)?;
            }
        }

        let file_name = destination
            .file_name()
            .ok_or_else(|| {
                fail(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "destination has no file name",
                ))
            })?
            .to_string_lossy();
        let temp_path =
            destination.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

        let rendered = self.render();
        debug!(
            temp = %temp_path.display(),
            bytes = rendered.len(),
            "Writing report"
        );

        if let Err(e) = fs::write(&temp_path, rendered.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(fail(e));
        }
        if let Err(e) = fs::rename(&temp_path, destination) {
            let _ = fs::remove_file(&temp_path);
            return Err(fail(e));
        }

        info!(path = %destination.display(), "Report written");
        Ok(())
    }
}
