//! Repository flattening
//!
//! Turns a repository directory into a [`SourceBundle`]: one ordered text blob
//! with every file's path and contents, plus a tree listing of the layout.

mod bundle;
mod flattener;
mod tree;

pub use bundle::SourceBundle;
pub use flattener::{IngestConfig, IngestSummary, RepositoryFlattener};
pub use tree::render_tree;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while producing or loading a source bundle
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Repository path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Repository path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No readable source files found under {}", .0.display())]
    NoFiles(PathBuf),

    #[error("Source bundle content is empty")]
    EmptyBundle,
}
