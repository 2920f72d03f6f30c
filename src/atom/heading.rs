//! `title <text>` through `title6 <text>`: headings `<h1>` to `<h6>`.

use super::{Atom, Parsed, TokenCursor, Tokenized, parse_scalar, tokenize_line};
use crate::types::{Node, Token, kind};
use maud::{Markup, PreEscaped, html};

/// Heading directive for one level. `title` is level 1, `titleN` level N.
#[derive(Debug, Clone)]
pub struct Heading {
    level: u8,
    keyword: String,
}

impl Heading {
    /// Level is clamped to 1..=6.
    pub fn new(level: u8) -> Self {
        let level = level.clamp(1, 6);
        let keyword = match level {
            1 => kind::TITLE.to_string(),
            n => format!("{}{n}", kind::TITLE),
        };
        Self { level, keyword }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl Atom for Heading {
    fn keyword(&self) -> &str {
        &self.keyword
    }

    fn tokenize(&self, line: &str, _lines: &[&str], _index: usize) -> Tokenized {
        tokenize_line(&self.keyword, line)
    }

    fn parse(&self, token: &Token, cursor: &TokenCursor<'_>) -> Option<Parsed> {
        parse_scalar(&self.keyword, token, cursor)
    }

    fn render_html(&self, node: &Node) -> Option<Markup> {
        if !node.is(&self.keyword) {
            return None;
        }
        let text = PreEscaped(node.as_text()?);
        Some(match self.level {
            1 => html! { h1 { (text) } },
            2 => html! { h2 { (text) } },
            3 => html! { h3 { (text) } },
            4 => html! { h4 { (text) } },
            5 => html! { h5 { (text) } },
            _ => html! { h6 { (text) } },
        })
    }
}
