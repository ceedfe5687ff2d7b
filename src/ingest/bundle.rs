use super::IngestError;
use std::fs;
use std::path::Path;

/// Flattened repository: every file's path and contents plus a tree listing.
///
/// Immutable once built. Stages only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBundle {
    content: String,
    tree: String,
}

impl SourceBundle {
    /// Builds a bundle from already-flattened text.
    ///
    /// Fails with [`IngestError::EmptyBundle`] when `content` holds nothing but
    /// whitespace; the tree may be empty.
    pub fn new(content: impl Into<String>, tree: impl Into<String>) -> Result<Self, IngestError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(IngestError::EmptyBundle);
        }

        Ok(Self {
            content,
            tree: tree.into(),
        })
    }

    /// Loads a bundle that was flattened by another tool.
    pub fn load(content_path: &Path, tree_path: &Path) -> Result<Self, IngestError> {
        let content = fs::read_to_string(content_path).map_err(|source| IngestError::Read {
            path: content_path.to_path_buf(),
            source,
        })?;
        let tree = fs::read_to_string(tree_path).map_err(|source| IngestError::Read {
            path: tree_path.to_path_buf(),
            source,
        })?;

        Self::new(content, tree)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tree(&self) -> &str {
        &self.tree
    }

    /// Tree listing followed by the file contents, as written by `ingest`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.tree.len() + self.content.len() + 2);
        out.push_str(&self.tree);
        if !self.tree.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.content);
        out
    }
}
