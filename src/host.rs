//! Script host: the capability `script` blocks run against.
//!
//! A document may embed a block of code:
//!
//! ```text
//! script
//! 	h2("Recent posts")
//! 	list("posts")
//! ```
//!
//! The compiler never evaluates that code itself. It hands the block to a
//! [`ScriptHost`] together with a [`HostContext`], the only surface the code
//! can touch: append to the page head and body, read frontmatter and
//! variables, list a directory below the document. Whatever language the
//! host speaks is its own business.
//!
//! Two hosts ship with the crate:
//!
//! - [`NoHost`]: skips scripts (with a warning). The library default.
//! - [`CallHost`]: one call per line, `name("argument")`, against a fixed
//!   function table. The CLI default.
//!
//! Any `Fn(&str, &mut HostContext<'_>) -> Result<(), HostError>` closure is
//! also a host.

use crate::atom::{Atom, Heading};
use crate::frontmatter::Frontmatter;
use crate::listing::{self, ListingEntry};
use crate::render::stylesheet_link;
use crate::types::Node;
use maud::html;
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: malformed call `{text}`")]
    Malformed { line: usize, text: String },
    #[error("line {line}: unknown function `{name}`")]
    UnknownFunction { line: usize, name: String },
    #[error("line {line}: `{name}` needs an argument")]
    MissingArgument { line: usize, name: String },
    #[error("line {line}: argument must be a JSON string: {source}")]
    Argument {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("path escapes the document directory: {0}")]
    OutsideDocument(String),
}

/// What a script may see and change while a page renders.
pub struct HostContext<'a> {
    head: &'a mut Vec<String>,
    body: &'a mut Vec<String>,
    frontmatter: &'a Frontmatter,
    vars: &'a BTreeMap<String, String>,
    base_dir: &'a Path,
    extension: &'a str,
}

impl<'a> HostContext<'a> {
    pub fn new(
        head: &'a mut Vec<String>,
        body: &'a mut Vec<String>,
        frontmatter: &'a Frontmatter,
        vars: &'a BTreeMap<String, String>,
        base_dir: &'a Path,
        extension: &'a str,
    ) -> Self {
        Self {
            head,
            body,
            frontmatter,
            vars,
            base_dir,
            extension,
        }
    }

    pub fn push_head(&mut self, html: impl Into<String>) {
        self.head.push(html.into());
    }

    pub fn push_body(&mut self, html: impl Into<String>) {
        self.body.push(html.into());
    }

    /// Append a heading rendered the same way as a `titleN` line.
    pub fn heading(&mut self, level: u8, text: &str) {
        let atom = Heading::new(level);
        if let Some(markup) = atom.render_html(&Node::text(atom.keyword(), text)) {
            self.body.push(markup.into_string());
        }
    }

    pub fn link_stylesheet(&mut self, href: &str) {
        self.head.push(stylesheet_link(href));
    }

    pub fn frontmatter(&self) -> &Frontmatter {
        self.frontmatter
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn extension(&self) -> &str {
        self.extension
    }

    /// List a directory relative to the document. Paths leaving the
    /// document directory are refused.
    pub fn list_directory(&self, relative: &str) -> Result<Vec<ListingEntry>, HostError> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(HostError::OutsideDocument(relative.display().to_string()));
        }
        Ok(listing::list_directory(
            &self.base_dir.join(relative),
            self.extension,
        )?)
    }
}

/// Runs `script` blocks. Shared across threads during directory builds.
pub trait ScriptHost: Send + Sync {
    fn run(&self, code: &str, ctx: &mut HostContext<'_>) -> Result<(), HostError>;
}

impl<F> ScriptHost for F
where
    F: Fn(&str, &mut HostContext<'_>) -> Result<(), HostError> + Send + Sync,
{
    fn run(&self, code: &str, ctx: &mut HostContext<'_>) -> Result<(), HostError> {
        self(code, ctx)
    }
}

/// Ignores scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl ScriptHost for NoHost {
    fn run(&self, code: &str, _ctx: &mut HostContext<'_>) -> Result<(), HostError> {
        tracing::warn!(lines = code.lines().count(), "No script host configured; skipping script");
        Ok(())
    }
}

/// Line-per-call script host.
///
/// Each non-blank line is `name()` or `name("json string")`; lines starting
/// with `//` are comments.
///
/// | Call | Effect |
/// |------|--------|
/// | `h1("t")` … `h6("t")` | heading in the body |
/// | `html("<hr>")` | raw HTML in the body |
/// | `head("<meta …>")` | raw HTML in the head |
/// | `link_css("site.css")` | stylesheet link in the head |
/// | `var("name")` | the variable's value in the body |
/// | `list()`, `list("dir")` | `<ul>` of the documents in a directory |
#[derive(Debug, Clone, Copy, Default)]
pub struct CallHost;

impl ScriptHost for CallHost {
    fn run(&self, code: &str, ctx: &mut HostContext<'_>) -> Result<(), HostError> {
        for (offset, raw) in code.lines().enumerate() {
            let line = offset + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with("//") {
                continue;
            }
            let (name, argument) = parse_call(line, text)?;
            call(ctx, line, name, argument)?;
        }
        Ok(())
    }
}

fn parse_call(line: usize, text: &str) -> Result<(&str, Option<String>), HostError> {
    let malformed = || HostError::Malformed {
        line,
        text: text.to_string(),
    };
    let (name, rest) = text.split_once('(').ok_or_else(malformed)?;
    let inner = rest.strip_suffix(')').ok_or_else(malformed)?.trim();
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed());
    }
    if inner.is_empty() {
        return Ok((name, None));
    }
    let argument = serde_json::from_str::<String>(inner)
        .map_err(|source| HostError::Argument { line, source })?;
    Ok((name, Some(argument)))
}

fn call(
    ctx: &mut HostContext<'_>,
    line: usize,
    name: &str,
    argument: Option<String>,
) -> Result<(), HostError> {
    let required = |argument: Option<String>| {
        argument.ok_or_else(|| HostError::MissingArgument {
            line,
            name: name.to_string(),
        })
    };

    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse().unwrap_or(1);
            ctx.heading(level, &required(argument)?);
        }
        "html" => ctx.push_body(required(argument)?),
        "head" => ctx.push_head(required(argument)?),
        "link_css" => ctx.link_stylesheet(&required(argument)?),
        "var" => {
            let var = required(argument)?;
            let value = ctx.variable(&var).unwrap_or_default().to_string();
            ctx.push_body(value);
        }
        "list" => {
            let dir = argument.unwrap_or_else(|| ".".to_string());
            let entries = ctx.list_directory(&dir)?;
            let markup = render_listing(&dir, &entries, ctx.extension());
            ctx.push_body(markup);
        }
        _ => {
            return Err(HostError::UnknownFunction {
                line,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// `<ul>` linking each document in a listing to its rendered page.
/// Importable documents have no page and are left out.
fn render_listing(dir: &str, entries: &[ListingEntry], extension: &str) -> String {
    let prefix = match dir.trim_end_matches('/') {
        "" | "." => String::new(),
        dir => format!("{dir}/"),
    };
    html! {
        ul.listing {
            @for entry in entries.iter().filter(|e| e.is_document(extension) && !e.importable) {
                @let stem = entry.path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
                li { a href={ (prefix) (stem) ".html" } { (entry.title()) } }
            }
        }
    }
    .into_string()
}
