//! HTML renderer: final node sequence → page.
//!
//! Two passes over the nodes. The first classifies: page flags, the title
//! (first `title` node wins), stylesheet links, frontmatter and variables.
//! The second emits body fragments in order:
//!
//! | Node | Output |
//! |------|--------|
//! | flags, `import`, `variable`, `frontmatter` | nothing |
//! | `script` | whatever the [`ScriptHost`] appends |
//! | claimed by an atom | the atom's markup |
//! | scalar starting with `<` | verbatim |
//! | other scalar | `<p>…</p>` |
//!
//! Without `html5` the joined body fragments are the whole output. With it
//! they are wrapped in a document shell; `metatags` adds charset, viewport,
//! `<title>` and description to its head.

use crate::atom::Registry;
use crate::config::PageConfig;
use crate::frontmatter::{self, Frontmatter};
use crate::host::{HostContext, ScriptHost};
use crate::import::is_stylesheet;
use crate::types::{Node, kind};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::path::Path;

/// `<link rel="stylesheet" href="…">`
pub fn stylesheet_link(href: &str) -> String {
    html! { link rel="stylesheet" href=(href); }.into_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub html: String,
    pub title: Option<String>,
    pub frontmatter: Frontmatter,
}

/// Per-compile accumulator; discarded once the page is built.
#[derive(Debug, Default)]
struct RenderState {
    head: Vec<String>,
    body: Vec<String>,
    frontmatter: Frontmatter,
    title: Option<String>,
    vars: BTreeMap<String, String>,
    contains_html5: bool,
    contains_metatags: bool,
}

pub struct Renderer<'a> {
    registry: &'a Registry,
    host: &'a dyn ScriptHost,
    page: &'a PageConfig,
    base_dir: &'a Path,
    extension: &'a str,
}

impl<'a> Renderer<'a> {
    pub fn new(
        registry: &'a Registry,
        host: &'a dyn ScriptHost,
        page: &'a PageConfig,
        base_dir: &'a Path,
        extension: &'a str,
    ) -> Self {
        Self {
            registry,
            host,
            page,
            base_dir,
            extension,
        }
    }

    pub fn render(&self, nodes: &[Node]) -> Rendered {
        let mut state = RenderState::default();
        classify(nodes, &mut state);

        for node in nodes {
            self.emit(node, &mut state);
        }

        let title = state
            .title
            .clone()
            .or_else(|| frontmatter::title(&state.frontmatter).map(String::from));
        let html = if state.contains_html5 {
            self.shell(&state, title.as_deref()).into_string()
        } else {
            state.body.join("\n")
        };

        Rendered {
            html,
            title,
            frontmatter: state.frontmatter,
        }
    }

    fn emit(&self, node: &Node, state: &mut RenderState) {
        match node.kind.as_str() {
            kind::HTML5
            | kind::METATAGS
            | kind::IMPORTABLE
            | kind::IMPORT
            | kind::VARIABLE
            | kind::FRONTMATTER => {}
            kind::SCRIPT => self.run_script(node.as_text().unwrap_or_default(), state),
            _ => {
                if let Some(markup) = self.registry.render_html(node) {
                    state.body.push(markup.into_string());
                } else if let Some(text) = node.as_text() {
                    state.body.push(scalar_html(text));
                } else {
                    tracing::debug!(kind = %node.kind, "No renderer for composite node");
                }
            }
        }
    }

    fn run_script(&self, code: &str, state: &mut RenderState) {
        let mut ctx = HostContext::new(
            &mut state.head,
            &mut state.body,
            &state.frontmatter,
            &state.vars,
            self.base_dir,
            self.extension,
        );
        if let Err(e) = self.host.run(code, &mut ctx) {
            tracing::warn!(error = %e, dir = %self.base_dir.display(), "Script failed");
        }
    }

    fn shell(&self, state: &RenderState, title: Option<&str>) -> Markup {
        let description = frontmatter::description(&state.frontmatter);
        html! {
            (DOCTYPE)
            html lang=(self.page.lang) {
                head {
                    @if state.contains_metatags {
                        meta charset=(self.page.charset);
                        meta name="viewport" content=(self.page.viewport);
                        @if let Some(title) = title {
                            title { (PreEscaped(title)) }
                        }
                        @if let Some(description) = description {
                            meta name="description" content=(description);
                        }
                    }
                    @for fragment in &state.head {
                        (PreEscaped(fragment))
                    }
                }
                body {
                    (PreEscaped(state.body.join("\n")))
                }
            }
        }
    }
}

fn classify(nodes: &[Node], state: &mut RenderState) {
    for node in nodes {
        match node.kind.as_str() {
            kind::HTML5 => state.contains_html5 = true,
            kind::METATAGS => state.contains_metatags = true,
            kind::TITLE => {
                if state.title.is_none() {
                    state.title = node.as_text().map(String::from);
                }
            }
            kind::IMPORT => match node.as_text() {
                Some(href) if is_stylesheet(href) => state.head.push(stylesheet_link(href)),
                _ => {}
            },
            kind::FRONTMATTER => {
                let parsed = frontmatter::parse(node.as_text().unwrap_or_default());
                state.frontmatter.extend(parsed);
            }
            kind::VARIABLE => {
                if let Some(name) = node.child_text(kind::VAR_NAME) {
                    let value = node.child_text(kind::VAR_VALUE).unwrap_or_default();
                    state.vars.insert(name.to_string(), value.to_string());
                }
            }
            _ => {}
        }
    }
}

/// Unclaimed scalar: HTML passes through, prose becomes a paragraph.
fn scalar_html(text: &str) -> String {
    if text.starts_with('<') {
        text.to_string()
    } else {
        html! { p { (PreEscaped(text)) } }.into_string()
    }
}
