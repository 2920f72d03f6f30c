//! Directory listings annotated with document frontmatter.
//!
//! Used by the `ls` command and by scripts (`list("posts")`) to build index
//! pages. Only markup documents are read; other entries get an empty
//! frontmatter mapping.

use crate::atom::Registry;
use crate::frontmatter::{self, Frontmatter};
use crate::tokenize::tokenize;
use crate::types::kind;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub frontmatter: Frontmatter,
    /// Declared `importable`, so a build writes no page for it.
    pub importable: bool,
}

impl ListingEntry {
    /// Whether this entry is a markup document with the given extension.
    pub fn is_document(&self, extension: &str) -> bool {
        !self.is_dir && self.path.extension().is_some_and(|e| e == extension)
    }

    /// Frontmatter title, falling back to the file stem.
    pub fn title(&self) -> String {
        frontmatter::title(&self.frontmatter)
            .map(String::from)
            .unwrap_or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.name.clone())
            })
    }
}

/// Immediate children of `dir`, sorted by file name.
pub fn list_directory(dir: &Path, extension: &str) -> io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        let is_dir = entry.file_type().is_dir();
        let path = entry.path().to_path_buf();

        let mut listed = ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
            frontmatter: Frontmatter::new(),
            importable: false,
        };
        if listed.is_document(extension) {
            match fs::read_to_string(&listed.path) {
                Ok(source) => {
                    listed.frontmatter = frontmatter::extract_frontmatter(&source);
                    listed.importable = declares_importable(&source);
                }
                Err(e) => {
                    tracing::warn!(path = %listed.path.display(), error = %e, "Failed to read document for listing");
                }
            }
        }
        entries.push(listed);
    }

    Ok(entries)
}

/// The flag only counts as its own line, not inside a paragraph or block.
fn declares_importable(source: &str) -> bool {
    tokenize(source, &Registry::builtin())
        .iter()
        .any(|t| t.is(kind::IMPORTABLE))
}
