//! `markdown` block: an indented body rendered with pulldown-cmark.
//!
//! ```text
//! markdown
//! 	Some *emphasis* and a [link](https://example.com).
//!
//! 	- one
//! 	- two
//! ```

use super::{Atom, Parsed, TokenCursor, Tokenized, indented_block, parse_scalar};
use crate::types::{Node, Token};
use maud::{Markup, PreEscaped};
use pulldown_cmark::{Parser, html as md_html};

const KEYWORD: &str = "markdown";

#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

impl Atom for Markdown {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn tokenize(&self, line: &str, lines: &[&str], index: usize) -> Tokenized {
        if line != KEYWORD {
            return Tokenized::none();
        }
        let (body, spanned) = indented_block(lines, index + 1);
        if body.is_empty() {
            return Tokenized::none();
        }
        Tokenized {
            jumped: 1 + spanned,
            tokens: vec![Token::new(KEYWORD, body.join("\n"))],
        }
    }

    fn parse(&self, token: &Token, cursor: &TokenCursor<'_>) -> Option<Parsed> {
        parse_scalar(KEYWORD, token, cursor)
    }

    fn render_html(&self, node: &Node) -> Option<Markup> {
        if !node.is(KEYWORD) {
            return None;
        }
        let mut out = String::new();
        md_html::push_html(&mut out, Parser::new(node.as_text()?));
        Some(PreEscaped(out.trim_end().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_indented_body() {
        let lines = ["markdown", "\t# Hi", "", "\tSome *text*", "", "next"];
        let result = Markdown.tokenize("markdown", &lines, 0);
        assert_eq!(result.jumped, 4);
        assert_eq!(result.tokens[0].value, "# Hi\n\nSome *text*");
    }

    #[test]
    fn bare_keyword_without_body_is_not_claimed() {
        let lines = ["markdown", "plain text"];
        assert!(!Markdown.tokenize("markdown", &lines, 0).is_match());
    }

    #[test]
    fn keyword_with_argument_is_not_claimed() {
        let lines = ["markdown is nice"];
        assert!(!Markdown.tokenize(lines[0], &lines, 0).is_match());
    }

    #[test]
    fn renders_through_pulldown_cmark() {
        let html = Markdown
            .render_html(&Node::text("markdown", "# Hi\n\nSome *text*"))
            .unwrap()
            .into_string();
        assert_eq!(html, "<h1>Hi</h1>\n<p>Some <em>text</em></p>");
    }
}
