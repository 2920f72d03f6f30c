//! `date <text>`: a dated annotation block.

use super::{Atom, Parsed, TokenCursor, Tokenized, parse_scalar, tokenize_line};
use crate::types::{Node, Token};
use maud::{Markup, PreEscaped, html};

const KEYWORD: &str = "date";

#[derive(Debug, Clone, Copy, Default)]
pub struct Date;

impl Atom for Date {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn tokenize(&self, line: &str, _lines: &[&str], _index: usize) -> Tokenized {
        tokenize_line(KEYWORD, line)
    }

    fn parse(&self, token: &Token, cursor: &TokenCursor<'_>) -> Option<Parsed> {
        parse_scalar(KEYWORD, token, cursor)
    }

    fn render_html(&self, node: &Node) -> Option<Markup> {
        if !node.is(KEYWORD) {
            return None;
        }
        let text = node.as_text()?;
        Some(html! { div.date { (PreEscaped(text)) } })
    }
}
