//! One-document compilation: load → tokenize → parse → import → render.
//!
//! [`Compiler`] owns the pieces every document shares (directive registry,
//! script host, page settings) and is `Sync`, so a directory build can hand
//! the same compiler to every worker.

use crate::atom::Registry;
use crate::config::{PageConfig, SiteConfig};
use crate::frontmatter::Frontmatter;
use crate::host::{NoHost, ScriptHost};
use crate::import::ImportResolver;
use crate::parse::parse;
use crate::render::Renderer;
use crate::tokenize::tokenize;
use crate::types::{Node, Token, kind};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("import cycle: {}", format_chain(chain))]
    ImportCycle { chain: Vec<PathBuf> },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A compiled document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub html: String,
    pub title: Option<String>,
    /// The document declared `importable`: it is meant to be spliced into
    /// others and gets no output file of its own.
    pub importable: bool,
    pub frontmatter: Frontmatter,
}

pub struct Compiler {
    registry: Registry,
    host: Box<dyn ScriptHost>,
    page: PageConfig,
    extension: String,
}

impl Compiler {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            host: Box::new(NoHost),
            page: PageConfig::default(),
            extension: SiteConfig::default().extension,
        }
    }

    /// Builtin directives with the page settings and extension from `config`.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            page: config.page.clone(),
            extension: config.extension.clone(),
            ..Self::new(Registry::builtin())
        }
    }

    pub fn with_host(mut self, host: impl ScriptHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn tokenize(&self, source: &str) -> Vec<Token> {
        tokenize(source, &self.registry)
    }

    /// Tokens to nodes, imports unresolved.
    pub fn parse(&self, source: &str) -> Vec<Node> {
        parse(&self.tokenize(source), &self.registry)
    }

    pub fn compile_file(&self, path: &Path) -> Result<Page, CompileError> {
        let io_error = |source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        };
        let canonical = fs::canonicalize(path).map_err(io_error)?;
        let source = fs::read_to_string(&canonical).map_err(io_error)?;
        let base_dir = canonical.parent().unwrap_or(Path::new("."));
        tracing::debug!(path = %path.display(), "Compiling document");
        self.compile(&source, base_dir, vec![canonical.clone()])
    }

    /// Compile `source` as if it lived in `base_dir`.
    pub fn compile_str(&self, source: &str, base_dir: &Path) -> Result<Page, CompileError> {
        self.compile(source, base_dir, Vec::new())
    }

    fn compile(
        &self,
        source: &str,
        base_dir: &Path,
        mut chain: Vec<PathBuf>,
    ) -> Result<Page, CompileError> {
        let nodes = self.parse(source);
        let importable = nodes.iter().any(|n| n.is(kind::IMPORTABLE));

        let resolved = ImportResolver::new(&self.registry, &self.extension)
            .resolve(nodes, base_dir, &mut chain)?;

        let rendered = Renderer::new(
            &self.registry,
            self.host.as_ref(),
            &self.page,
            base_dir,
            &self.extension,
        )
        .render(&resolved);

        Ok(Page {
            html: rendered.html,
            title: rendered.title,
            importable,
            frontmatter: rendered.frontmatter,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(Registry::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CallHost;
    use crate::test_helpers::write_doc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn compile_str_renders_body() {
        let page = Compiler::default()
            .compile_str("title Hi\n\nSome words\nimage a.png\n\talt An A", Path::new("."))
            .unwrap();
        assert_eq!(
            page.html,
            "<h1>Hi</h1>\n<p>Some words</p>\n<img src=\"a.png\" alt=\"An A\">"
        );
        assert_eq!(page.title.as_deref(), Some("Hi"));
        assert!(!page.importable);
    }

    #[test]
    fn importable_flag_is_reported() {
        let page = Compiler::default()
            .compile_str("importable\nPart", Path::new("."))
            .unwrap();
        assert!(page.importable);
        assert_eq!(page.html, "<p>Part</p>");
    }

    #[test]
    fn compile_file_resolves_imports_next_to_it() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "docs/a.sphst", "import b\nA");
        write_doc(tmp.path(), "docs/b.sphst", "importable\ntitle2 B");
        let page = Compiler::default()
            .compile_file(&tmp.path().join("docs/a.sphst"))
            .unwrap();
        assert_eq!(page.html, "<h2>B</h2>\n<p>A</p>");
    }

    #[test]
    fn root_document_in_cycle_chain() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "a.sphst", "import b");
        write_doc(tmp.path(), "b.sphst", "import a");
        let err = Compiler::default()
            .compile_file(&tmp.path().join("a.sphst"))
            .unwrap_err();
        let CompileError::ImportCycle { chain } = &err else {
            panic!("expected cycle, got {err:?}");
        };
        assert_eq!(chain.len(), 3);
        assert!(err.to_string().contains(" -> "));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = Compiler::default()
            .compile_file(&tmp.path().join("nope.sphst"))
            .unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
        assert!(err.to_string().contains("nope.sphst"));
    }

    #[test]
    fn from_config_uses_page_settings() {
        let mut config = SiteConfig::default();
        config.page.lang = "de".to_string();
        let page = Compiler::from_config(&config)
            .compile_str("html5\nHallo", Path::new("."))
            .unwrap();
        assert!(page.html.starts_with("<!DOCTYPE html><html lang=\"de\">"));
    }

    #[test]
    fn from_config_uses_extension() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "part.doc", "Imported");
        let mut config = SiteConfig::default();
        config.extension = "doc".to_string();
        let page = Compiler::from_config(&config)
            .compile_str("import part", tmp.path())
            .unwrap();
        assert_eq!(page.html, "<p>Imported</p>");
    }

    #[test]
    fn host_is_used_for_scripts() {
        let page = Compiler::default()
            .with_host(CallHost)
            .compile_str("script\n\thtml(\"<hr>\")", Path::new("."))
            .unwrap();
        assert_eq!(page.html, "<hr>");
    }

    #[test]
    fn default_host_skips_scripts() {
        let page = Compiler::default()
            .compile_str("script\n\thtml(\"<hr>\")\nafter", Path::new("."))
            .unwrap();
        assert_eq!(page.html, "<p>after</p>");
    }
}
