//! Document discovery.
//!
//! Finds the markup documents a build should compile. The input is either a
//! single document or a directory; a directory is walked recursively:
//!
//! ```text
//! site/
//! ├── sophist.toml          # config (optional)
//! ├── index.sphst           # → out/index.html
//! ├── header.sphst          # `importable`: compiled, no output
//! ├── style.css             # not a document; imported by reference
//! ├── posts/
//! │   └── first.sphst       # → out/posts/first.html
//! └── .git/                 # skipped (build.skip_dirs)
//! ```
//!
//! Results are sorted by relative path so builds and their reports are
//! deterministic.

use crate::config::BuildConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A discovered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path to read from.
    pub path: PathBuf,
    /// Path relative to the scan root; mirrors into the output tree.
    pub relative: PathBuf,
}

/// Discover documents under `input`, a file or a directory.
///
/// Returns the scan root (the directory itself, or the file's parent) and
/// the documents found.
pub fn scan(
    input: &Path,
    extension: &str,
    build: &BuildConfig,
) -> Result<(PathBuf, Vec<Document>), ScanError> {
    if !input.exists() {
        return Err(ScanError::NotFound(input.to_path_buf()));
    }

    if input.is_file() {
        let root = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let relative = input
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| ScanError::NotFound(input.to_path_buf()))?;
        return Ok((
            root,
            vec![Document {
                path: input.to_path_buf(),
                relative,
            }],
        ));
    }

    let mut documents = Vec::new();
    let walker = WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !is_skipped(entry.file_name().to_string_lossy().as_ref(), build)
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(input)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        documents.push(Document {
            path: entry.path().to_path_buf(),
            relative,
        });
    }

    documents.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::debug!(root = %input.display(), count = documents.len(), "Scanned documents");
    Ok((input.to_path_buf(), documents))
}

fn is_skipped(name: &str, build: &BuildConfig) -> bool {
    build.skip_dirs.iter().any(|skip| skip == name)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|e| e == extension)
}
