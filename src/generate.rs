//! Directory builds: compile every document and write the pages.
//!
//! Documents found by [`scan`](crate::scan) are compiled in parallel on the
//! rayon pool. Each page is written to the output root mirroring its source
//! path, with the document extension replaced by `.html`:
//!
//! ```text
//! site/index.sphst        → out/index.html
//! site/posts/first.sphst  → out/posts/first.html
//! site/header.sphst       → (importable, no output)
//! ```
//!
//! A failing document is recorded in the [`BuildReport`] and does not stop
//! its siblings. Progress is optionally streamed as [`BuildEvent`]s so the
//! CLI can print while workers are still running.

use crate::compile::Compiler;
use crate::config::BuildConfig;
use crate::scan::{self, Document, ScanError};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Written {
        source: PathBuf,
        output: PathBuf,
        title: Option<String>,
    },
    /// Declared `importable`; only used through imports.
    Skipped { source: PathBuf },
    Failed { source: PathBuf, error: String },
}

impl BuildEvent {
    pub fn source(&self) -> &Path {
        match self {
            Self::Written { source, .. } | Self::Skipped { source } | Self::Failed { source, .. } => {
                source
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// One event per document, in source path order.
    pub events: Vec<BuildEvent>,
}

impl BuildReport {
    pub fn written(&self) -> usize {
        self.count(|e| matches!(e, BuildEvent::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|e| matches!(e, BuildEvent::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(BuildEvent::is_failure)
    }

    fn count(&self, pred: impl Fn(&BuildEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Build every document under `input` (a file or directory) into `output_dir`.
pub fn generate(
    compiler: &Compiler,
    input: &Path,
    output_dir: &Path,
    build: &BuildConfig,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, GenerateError> {
    let (_, documents) = scan::scan(input, compiler.extension(), build)?;
    fs::create_dir_all(output_dir)?;
    tracing::info!(count = documents.len(), output = %output_dir.display(), "Building documents");

    let events_ref = events.as_ref();
    let results: Vec<BuildEvent> = documents
        .par_iter()
        .map(|document| {
            let event = build_one(compiler, document, output_dir);
            if let Some(tx) = events_ref {
                // Receiver gone only means nobody is listening.
                let _ = tx.send(event.clone());
            }
            event
        })
        .collect();

    Ok(BuildReport {
        output_dir: output_dir.to_path_buf(),
        events: results,
    })
}

/// Output path for a document: mirrored under `output_dir` with `.html`.
pub fn output_path(output_dir: &Path, relative: &Path) -> PathBuf {
    output_dir.join(relative.with_extension("html"))
}

fn build_one(compiler: &Compiler, document: &Document, output_dir: &Path) -> BuildEvent {
    let source = document.relative.clone();
    let failed = |error: String| {
        tracing::warn!(path = %document.path.display(), error = %error, "Document failed");
        BuildEvent::Failed {
            source: source.clone(),
            error,
        }
    };

    let page = match compiler.compile_file(&document.path) {
        Ok(page) => page,
        Err(e) => return failed(e.to_string()),
    };
    if page.importable {
        return BuildEvent::Skipped { source };
    }

    let output = output_path(output_dir, &document.relative);
    let written = output
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(&output, &page.html));
    if let Err(e) = written {
        return failed(format!("failed to write {}: {e}", output.display()));
    }

    BuildEvent::Written {
        source,
        output: document.relative.with_extension("html"),
        title: page.title,
    }
}
