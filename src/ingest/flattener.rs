use super::{render_tree, IngestError, SourceBundle};
use ignore::WalkBuilder;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

const SEPARATOR: &str = "================================================";
const BINARY_SNIFF_BYTES: usize = 8192;

const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    ".gradle",
    ".mvn",
    "target",
    "build",
    "out",
    "dist",
    "node_modules",
    "__pycache__",
    ".venv",
];

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub max_depth: usize,
    pub max_files: usize,
    pub max_file_size: u64,
    pub excluded_dirs: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_files: 10_000,
            max_file_size: 10 * 1024 * 1024,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Counts gathered while flattening a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub repository: String,
    pub files_included: usize,
    pub files_skipped: usize,
    pub total_bytes: usize,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repository: {}", self.repository)?;
        writeln!(f, "Files analyzed: {}", self.files_included)?;
        writeln!(f, "Files skipped: {}", self.files_skipped)?;
        write!(f, "Total size: {} bytes", self.total_bytes)
    }
}

/// Walks a repository and produces a [`SourceBundle`].
///
/// Files are visited in path order so the same tree always flattens to the
/// same bytes. `.gitignore` rules are honoured, binary files and files above
/// `max_file_size` are skipped.
pub struct RepositoryFlattener {
    repo_path: PathBuf,
    config: IngestConfig,
}

impl RepositoryFlattener {
    pub fn new(repo_path: PathBuf) -> Result<Self, IngestError> {
        if !repo_path.exists() {
            return Err(IngestError::PathNotFound(repo_path));
        }
        if !repo_path.is_dir() {
            return Err(IngestError::NotADirectory(repo_path));
        }

        let repo_path = repo_path
            .canonicalize()
            .map_err(|source| IngestError::Read {
                path: repo_path.clone(),
                source,
            })?;

        debug!(repo_path = %repo_path.display(), "RepositoryFlattener initialized");

        Ok(Self {
            repo_path,
            config: IngestConfig::default(),
        })
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn flatten(&self) -> Result<(SourceBundle, IngestSummary), IngestError> {
        let start = Instant::now();
        let repository = self
            .repo_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.repo_path.display().to_string());

        info!(
            repo = %self.repo_path.display(),
            max_depth = self.config.max_depth,
            max_files = self.config.max_files,
            "Flattening repository"
        );

        let excluded = self.config.excluded_dirs.clone();
        let walker = WalkBuilder::new(&self.repo_path)
            .max_depth(Some(self.config.max_depth))
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                !(is_dir
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| excluded.iter().any(|d| d == name)))
            })
            .build();

        let mut content = String::new();
        let mut paths = Vec::new();
        let mut files_skipped = 0;
        let mut total_bytes = 0;

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if paths.len() >= self.config.max_files {
                warn!(
                    max_files = self.config.max_files,
                    "Reached file limit, stopping walk"
                );
                break;
            }

            let rel_path = self.relative_path(path);

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > self.config.max_file_size {
                debug!(path = %rel_path, size, "Skipping oversized file");
                files_skipped += 1;
                continue;
            }

            let bytes = fs::read(path).map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if is_binary(&bytes) {
                debug!(path = %rel_path, "Skipping binary file");
                files_skipped += 1;
                continue;
            }

            let text = String::from_utf8_lossy(&bytes);
            total_bytes += bytes.len();
            append_file(&mut content, &rel_path, &text);
            paths.push(rel_path);
        }

        if paths.is_empty() {
            return Err(IngestError::NoFiles(self.repo_path.clone()));
        }

        let tree = render_tree(&repository, &paths);
        let summary = IngestSummary {
            repository,
            files_included: paths.len(),
            files_skipped,
            total_bytes,
        };

        info!(
            files = summary.files_included,
            skipped = summary.files_skipped,
            bytes = summary.total_bytes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Repository flattened"
        );

        Ok((SourceBundle::new(content, tree)?, summary))
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.repo_path)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_BYTES).any(|b| *b == 0)
}

fn append_file(out: &mut String, rel_path: &str, text: &str) {
    out.push_str(SEPARATOR);
    out.push_str("\nFILE: ");
    out.push_str(rel_path);
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(text);
    out.push_str("\n\n");
}
