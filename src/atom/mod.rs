//! Pluggable directive handlers ("atoms").
//!
//! An atom owns one markup construct end to end: it recognizes the construct
//! while tokenizing, builds its node while parsing, and turns that node into
//! HTML while rendering. The pipeline never matches on directive keywords
//! itself; it asks the [`Registry`], which tries each atom in order and takes
//! the first that answers.
//!
//! ```text
//! tokenize(line, lines, index) → Tokenized { jumped, tokens }   (empty = no match)
//! parse(token, cursor)         → Option<Parsed { jumped, node }>
//! render_html(node)            → Option<Markup>
//! ```
//!
//! `jumped` is the number of lines (tokenize) or tokens (parse) the atom
//! consumed starting at the current one, so it is at least 1 on a match.
//!
//! # Adding a directive
//!
//! ```
//! use maud::{Markup, html};
//! use sophist::atom::{self, Atom, Parsed, Registry, TokenCursor, Tokenized};
//! use sophist::types::{Node, Token};
//!
//! struct Quote;
//!
//! impl Atom for Quote {
//!     fn keyword(&self) -> &str { "quote" }
//!
//!     fn tokenize(&self, line: &str, _lines: &[&str], _index: usize) -> Tokenized {
//!         atom::tokenize_line(self.keyword(), line)
//!     }
//!
//!     fn parse(&self, token: &Token, cursor: &TokenCursor<'_>) -> Option<Parsed> {
//!         atom::parse_scalar(self.keyword(), token, cursor)
//!     }
//!
//!     fn render_html(&self, node: &Node) -> Option<Markup> {
//!         let text = node.as_text().filter(|_| node.is("quote"))?;
//!         Some(html! { blockquote { (text) } })
//!     }
//! }
//!
//! let registry = Registry::builtin().with(Quote);
//! let html = sophist::compile::Compiler::new(registry)
//!     .compile_str("quote Less is more", std::path::Path::new("."))
//!     .unwrap()
//!     .html;
//! assert_eq!(html, "<blockquote>Less is more</blockquote>");
//! ```

mod date;
mod heading;
mod image;
mod markdown;

pub use date::Date;
pub use heading::Heading;
pub use image::Image;
pub use markdown::Markdown;

use crate::types::{Node, Token};
use maud::Markup;
use std::fmt;

/// Result of [`Atom::tokenize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    /// Input lines consumed, counting the current one.
    pub jumped: usize,
    pub tokens: Vec<Token>,
}

impl Tokenized {
    /// The "not mine" answer.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        !self.tokens.is_empty()
    }
}

/// Result of a successful [`Atom::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// Tokens consumed, counting the current one.
    pub jumped: usize,
    pub node: Node,
}

/// Read-only view of the token stream at the parser's cursor.
#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token], index: usize) -> Self {
        Self { tokens, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// Token at `cursor + offset`.
    pub fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.index + offset)
    }

    /// Value of the token at `cursor + offset`.
    pub fn value(&self, offset: usize) -> Option<&'a str> {
        self.peek(offset).map(|t| t.value.as_str())
    }
}

/// One directive's tokenize/parse/render capability.
///
/// Implementations must be side-effect free when they do not recognize their
/// input. They are shared across threads during directory builds.
pub trait Atom: Send + Sync {
    /// Stable keyword, also used as token and node kind.
    fn keyword(&self) -> &str;

    /// Recognize the construct starting at `lines[index]`. `line` is that
    /// line trimmed.
    fn tokenize(&self, line: &str, lines: &[&str], index: usize) -> Tokenized;

    /// Build a node from the token under the cursor.
    fn parse(&self, token: &Token, cursor: &TokenCursor<'_>) -> Option<Parsed>;

    /// Render a node this atom produced; `None` for any other node.
    fn render_html(&self, node: &Node) -> Option<Markup>;
}

/// Argument of a `"<keyword> <argument>"` line, trimmed.
pub fn line_argument<'a>(keyword: &str, line: &'a str) -> Option<&'a str> {
    line.strip_prefix(keyword)?
        .strip_prefix(' ')
        .map(str::trim)
}

/// Tokenize a single-line `"<keyword> <text>"` directive.
pub fn tokenize_line(keyword: &str, line: &str) -> Tokenized {
    match line_argument(keyword, line) {
        Some(value) => Tokenized {
            jumped: 1,
            tokens: vec![Token::new(keyword, value)],
        },
        None => Tokenized::none(),
    }
}

/// Parse a token of kind `keyword` into a scalar node holding its value.
pub fn parse_scalar(keyword: &str, token: &Token, cursor: &TokenCursor<'_>) -> Option<Parsed> {
    if !token.is(keyword) {
        return None;
    }
    Some(Parsed {
        jumped: 1,
        node: Node::text(keyword, cursor.value(0).unwrap_or_default()),
    })
}

/// Strip one level of block indentation: a tab or four spaces.
pub fn strip_indent(line: &str) -> Option<&str> {
    line.strip_prefix('\t')
        .or_else(|| line.strip_prefix("    "))
}

/// Collect the indented block starting at `lines[start]`.
///
/// Returns the dedented lines and how many input lines the block spans.
/// Blank lines inside the block are kept; trailing blank lines are not part
/// of it.
pub fn indented_block<'a>(lines: &[&'a str], start: usize) -> (Vec<&'a str>, usize) {
    let mut body = Vec::new();
    let mut pending_blank = 0;
    let mut spanned = 0;
    let mut i = start;

    while let Some(line) = lines.get(i) {
        if line.trim().is_empty() {
            pending_blank += 1;
            i += 1;
            continue;
        }
        let Some(rest) = strip_indent(line) else {
            break;
        };
        body.extend(std::iter::repeat_n("", pending_blank));
        pending_blank = 0;
        body.push(rest.trim_end());
        i += 1;
        spanned = i - start;
    }

    (body, spanned)
}

/// Ordered list of atoms; recognition is first match wins.
pub struct Registry {
    atoms: Vec<Box<dyn Atom>>,
}

impl Registry {
    /// A registry with no directives: every non-builtin line becomes text.
    pub fn empty() -> Self {
        Self { atoms: Vec::new() }
    }

    /// `title`..`title6`, `date`, `image`, `markdown`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for level in 1..=6 {
            registry.push(Box::new(Heading::new(level)));
        }
        registry.push(Box::new(Date));
        registry.push(Box::new(Image));
        registry.push(Box::new(Markdown));
        registry
    }

    /// Append an atom (lowest priority).
    pub fn with(mut self, atom: impl Atom + 'static) -> Self {
        self.push(Box::new(atom));
        self
    }

    pub fn push(&mut self, atom: Box<dyn Atom>) {
        self.atoms.push(atom);
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.atoms.iter().map(|a| a.keyword()).collect()
    }

    /// First atom that recognizes `lines[index]`.
    pub fn tokenize(&self, line: &str, lines: &[&str], index: usize) -> Option<Tokenized> {
        self.atoms
            .iter()
            .map(|atom| atom.tokenize(line, lines, index))
            .find(Tokenized::is_match)
    }

    /// First atom that builds a node from the token under the cursor.
    pub fn parse(&self, cursor: &TokenCursor<'_>) -> Option<Parsed> {
        let token = cursor.peek(0)?;
        self.atoms.iter().find_map(|atom| atom.parse(token, cursor))
    }

    /// First atom that renders `node`.
    pub fn render_html(&self, node: &Node) -> Option<Markup> {
        self.atoms.iter().find_map(|atom| atom.render_html(node))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("keywords", &self.keywords())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_order() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.keywords(),
            vec![
                "title", "title2", "title3", "title4", "title5", "title6", "date", "image",
                "markdown"
            ]
        );
    }

    #[test]
    fn line_argument_requires_separator() {
        assert_eq!(line_argument("title", "title Hello "), Some("Hello"));
        assert_eq!(line_argument("title", "title2 Hello"), None);
        assert_eq!(line_argument("title", "titles Hello"), None);
        assert_eq!(line_argument("title", "title"), None);
    }

    #[test]
    fn tokenize_line_no_match_is_empty() {
        let result = tokenize_line("date", "not a date");
        assert!(!result.is_match());
        assert_eq!(result.jumped, 0);
    }

    #[test]
    fn registry_first_match_wins() {
        let registry = Registry::builtin();
        let lines = ["title2 Sub"];
        let result = registry.tokenize(lines[0], &lines, 0).unwrap();
        assert_eq!(result.tokens, vec![Token::new("title2", "Sub")]);
    }

    #[test]
    fn registry_without_match_returns_none() {
        let registry = Registry::builtin();
        let lines = ["subtitle Nope"];
        assert!(registry.tokenize(lines[0], &lines, 0).is_none());
    }

    #[test]
    fn empty_registry_renders_nothing() {
        let registry = Registry::empty();
        assert!(registry.render_html(&Node::text("title", "x")).is_none());
    }

    #[test]
    fn cursor_reads_relative_values() {
        let tokens = vec![Token::new("image", "a.png"), Token::new("alt", "A")];
        let cursor = TokenCursor::new(&tokens, 0);
        assert_eq!(cursor.value(0), Some("a.png"));
        assert_eq!(cursor.value(1), Some("A"));
        assert_eq!(cursor.value(2), None);
        assert_eq!(TokenCursor::new(&tokens, 1).peek(0).unwrap().kind, "alt");
    }

    #[test]
    fn strip_indent_accepts_tab_or_four_spaces() {
        assert_eq!(strip_indent("\talt x"), Some("alt x"));
        assert_eq!(strip_indent("    alt x"), Some("alt x"));
        assert_eq!(strip_indent("  alt x"), None);
    }

    #[test]
    fn indented_block_keeps_inner_blank_lines() {
        let lines = ["markdown", "\t# Hi", "", "    body", "", "after"];
        let (body, spanned) = indented_block(&lines, 1);
        assert_eq!(body, vec!["# Hi", "", "body"]);
        assert_eq!(spanned, 3);
    }

    #[test]
    fn indented_block_empty_when_not_indented() {
        let lines = ["markdown", "plain"];
        let (body, spanned) = indented_block(&lines, 1);
        assert!(body.is_empty());
        assert_eq!(spanned, 0);
    }
}
