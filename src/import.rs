//! Import resolution (transclusion).
//!
//! Runs over a parsed document before rendering and replaces each `import`
//! node:
//!
//! | Reference | Result |
//! |-----------|--------|
//! | `header.sphst`, `header` | the referenced document's nodes, recursively resolved |
//! | `style.css` | kept; the renderer turns it into a stylesheet `<link>` |
//! | missing file, other extension | nothing, with a warning |
//!
//! Paths resolve against the importing document's directory. Stylesheet
//! references from nested documents are rewritten so they stay correct
//! relative to the top-level document.
//!
//! `importable` flags are stripped from the result: they only decide whether
//! a document gets its own output file.
//!
//! The chain of documents being expanded is tracked by canonical path, and a
//! document that imports itself, directly or through others, fails with
//! [`CompileError::ImportCycle`].

use crate::atom::Registry;
use crate::compile::CompileError;
use crate::parse::parse;
use crate::tokenize::tokenize;
use crate::types::{Node, kind};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// What an `import` reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Document(PathBuf),
    Stylesheet,
    Unsupported,
}

/// Classify an import reference for documents with the given extension.
pub fn classify(reference: &str, extension: &str) -> Reference {
    let path = Path::new(reference);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("css") => Reference::Stylesheet,
        Some(ext) if ext == extension => Reference::Document(path.to_path_buf()),
        Some(_) => Reference::Unsupported,
        None => Reference::Document(PathBuf::from(format!("{reference}.{extension}"))),
    }
}

pub fn is_stylesheet(reference: &str) -> bool {
    Path::new(reference)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("css"))
}

pub struct ImportResolver<'a> {
    registry: &'a Registry,
    extension: &'a str,
}

impl<'a> ImportResolver<'a> {
    pub fn new(registry: &'a Registry, extension: &'a str) -> Self {
        Self {
            registry,
            extension,
        }
    }

    /// Expand all imports in `nodes`.
    ///
    /// `chain` holds the canonical paths of the documents currently being
    /// expanded, outermost first; it is restored before returning.
    pub fn resolve(
        &self,
        nodes: Vec<Node>,
        base_dir: &Path,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Vec<Node>, CompileError> {
        self.expand(nodes, base_dir, Path::new(""), chain)
    }

    fn expand(
        &self,
        nodes: Vec<Node>,
        base_dir: &Path,
        prefix: &Path,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Vec<Node>, CompileError> {
        let mut resolved = Vec::with_capacity(nodes.len());

        for node in nodes {
            if node.is(kind::IMPORTABLE) {
                continue;
            }
            if !node.is(kind::IMPORT) {
                resolved.push(node);
                continue;
            }

            let reference = node.as_text().unwrap_or_default();
            match classify(reference, self.extension) {
                Reference::Stylesheet => {
                    resolved.push(Node::text(kind::IMPORT, rebase_href(prefix, reference)));
                }
                Reference::Document(relative) => {
                    let nested_prefix = prefix.join(relative.parent().unwrap_or(Path::new("")));
                    let imported = self.load(&base_dir.join(&relative), &nested_prefix, chain)?;
                    resolved.extend(imported);
                }
                Reference::Unsupported => {
                    tracing::warn!(reference, "Unsupported import; expanding to nothing");
                }
            }
        }

        Ok(resolved)
    }

    fn load(
        &self,
        path: &Path,
        prefix: &Path,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Vec<Node>, CompileError> {
        let canonical = match fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Import not found; expanding to nothing");
                return Ok(Vec::new());
            }
        };

        if chain.contains(&canonical) {
            let mut cycle = chain.clone();
            cycle.push(canonical);
            return Err(CompileError::ImportCycle { chain: cycle });
        }

        let source = match fs::read_to_string(&canonical) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %canonical.display(), error = %e, "Import unreadable; expanding to nothing");
                return Ok(Vec::new());
            }
        };
        tracing::debug!(path = %canonical.display(), "Importing document");

        let nodes = parse(&tokenize(&source, self.registry), self.registry);
        let base_dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();

        chain.push(canonical);
        let expanded = self.expand(nodes, &base_dir, prefix, chain);
        chain.pop();
        expanded
    }
}

/// Rewrite a stylesheet href found in a document under `prefix` (relative to
/// the top-level document) so it still points at the same file.
fn rebase_href(prefix: &Path, reference: &str) -> String {
    let absolute = reference.starts_with('/') || reference.contains("://");
    if absolute || prefix.as_os_str().is_empty() {
        return reference.to_string();
    }
    let mut parts: Vec<String> = prefix
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.push(reference.to_string());
    parts.join("/")
}
