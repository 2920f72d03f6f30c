//! `image <src>` with an optional indented `alt <text>` continuation line.
//!
//! ```text
//! image pic.png
//! 	alt A cat
//! ```
//!
//! The continuation is indented by a tab or four spaces and becomes a second
//! token of kind `alt`, which the parser folds back into one image node.

use super::{Atom, Parsed, TokenCursor, Tokenized, line_argument, strip_indent};
use crate::types::{Node, Token, kind};
use maud::{Markup, html};

const KEYWORD: &str = "image";

#[derive(Debug, Clone, Copy, Default)]
pub struct Image;

impl Atom for Image {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn tokenize(&self, line: &str, lines: &[&str], index: usize) -> Tokenized {
        let Some(src) = line_argument(KEYWORD, line) else {
            return Tokenized::none();
        };
        let mut tokens = vec![Token::new(KEYWORD, src)];

        // Exactly one line of lookahead.
        let alt = lines
            .get(index + 1)
            .and_then(|next| strip_indent(next))
            .and_then(|next| line_argument("alt", next));
        if let Some(alt) = alt {
            tokens.push(Token::new(kind::ALT, alt));
        }

        Tokenized {
            jumped: tokens.len(),
            tokens,
        }
    }

    fn parse(&self, token: &Token, cursor: &TokenCursor<'_>) -> Option<Parsed> {
        if !token.is(KEYWORD) {
            return None;
        }
        let mut children = vec![Node::text(kind::IMAGE_SRC, cursor.value(0)?)];
        if cursor.peek(1).is_some_and(|t| t.is(kind::ALT)) {
            children.push(Node::text(kind::IMAGE_ALT, cursor.value(1)?));
        }
        Some(Parsed {
            jumped: children.len(),
            node: Node::composite(KEYWORD, children),
        })
    }

    fn render_html(&self, node: &Node) -> Option<Markup> {
        if !node.is(KEYWORD) {
            return None;
        }
        let src = node.child_text(kind::IMAGE_SRC);
        let alt = node.child_text(kind::IMAGE_ALT);
        Some(html! { img src=[src] alt=[alt]; })
    }
}
