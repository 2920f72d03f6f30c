//! Tree builder: token sequence → ordered [`Node`] sequence.
//!
//! A single forward cursor. Built-in token kinds map to fixed node shapes;
//! everything else goes to the registry, whose answer says how many tokens
//! it consumed. Every token ends up in exactly one node or is dropped on
//! purpose (an `alt` with no image before it, a kind nobody claims).

use crate::atom::{Registry, TokenCursor};
use crate::types::{Node, Token, kind};

pub fn parse(tokens: &[Token], registry: &Registry) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(tokens.len());
    let mut index = 0;

    while let Some(token) = tokens.get(index) {
        if let Some(node) = builtin_node(token) {
            nodes.push(node);
            index += 1;
            continue;
        }

        if let Some(parsed) = registry.parse(&TokenCursor::new(tokens, index)) {
            if parsed.jumped == 0 {
                tracing::warn!(kind = %token.kind, "Directive parsed without consuming its token");
            }
            index += parsed.jumped.max(1);
            nodes.push(parsed.node);
            continue;
        }

        if token.is(kind::TEXT) {
            nodes.push(Node::text(kind::TEXT, token.value.as_str()));
        } else {
            tracing::debug!(kind = %token.kind, value = %token.value, "Dropping unclaimed token");
        }
        index += 1;
    }

    nodes
}

fn builtin_node(token: &Token) -> Option<Node> {
    match token.kind.as_str() {
        kind::HTML5 | kind::METATAGS | kind::IMPORTABLE => {
            Some(Node::text(token.kind.as_str(), "true"))
        }
        kind::IMPORT | kind::FRONTMATTER | kind::SCRIPT => {
            Some(Node::text(token.kind.as_str(), token.value.as_str()))
        }
        kind::VARIABLE => Some(variable_node(&token.value)),
        _ => None,
    }
}

/// `name value…` split on the first whitespace.
fn variable_node(value: &str) -> Node {
    let (name, value) = value
        .split_once(char::is_whitespace)
        .map(|(name, value)| (name, value.trim()))
        .unwrap_or((value, ""));
    Node::composite(
        kind::VARIABLE,
        vec![
            Node::text(kind::VAR_NAME, name),
            Node::text(kind::VAR_VALUE, value),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Atom, Parsed, Tokenized};
    use crate::tokenize::tokenize;
    use maud::Markup;

    fn nodes(source: &str) -> Vec<Node> {
        let registry = Registry::builtin();
        parse(&tokenize(source, &registry), &registry)
    }

    #[test]
    fn directive_tokens_become_scalar_nodes() {
        assert_eq!(
            nodes("title Hello\ndate Today\nSome text"),
            vec![
                Node::text("title", "Hello"),
                Node::text("date", "Today"),
                Node::text("text", "Some text"),
            ]
        );
    }

    #[test]
    fn flags_have_fixed_content() {
        assert_eq!(
            nodes("html5\nmetatags\nimportable"),
            vec![
                Node::text("html5", "true"),
                Node::text("metatags", "true"),
                Node::text("importable", "true"),
            ]
        );
    }

    #[test]
    fn variable_splits_on_first_whitespace() {
        let parsed = nodes("var author  Ada   Lovelace");
        assert_eq!(parsed[0].child_text(kind::VAR_NAME), Some("author"));
        assert_eq!(parsed[0].child_text(kind::VAR_VALUE), Some("Ada   Lovelace"));
    }

    #[test]
    fn variable_without_value() {
        let parsed = nodes("var flag");
        assert_eq!(parsed[0].child_text(kind::VAR_NAME), Some("flag"));
        assert_eq!(parsed[0].child_text(kind::VAR_VALUE), Some(""));
    }

    #[test]
    fn image_and_alt_collapse_to_one_node() {
        let parsed = nodes("image pic.png\n\talt A cat\nafter");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].children().len(), 2);
        assert_eq!(parsed[1], Node::text("text", "after"));
    }

    #[test]
    fn orphan_alt_token_is_dropped() {
        let registry = Registry::builtin();
        let tokens = vec![Token::new("alt", "lonely"), Token::new("text", "kept")];
        assert_eq!(parse(&tokens, &registry), vec![Node::text("text", "kept")]);
    }

    #[test]
    fn unclaimed_directive_token_is_dropped_with_empty_registry() {
        let tokens = vec![Token::new("title", "x"), Token::new("import", "a.css")];
        assert_eq!(
            parse(&tokens, &Registry::empty()),
            vec![Node::text("import", "a.css")]
        );
    }

    #[test]
    fn order_mirrors_tokens() {
        let kinds: Vec<String> = nodes("import head\ntitle A\nimage x.png\ntext\ntitle2 B")
            .into_iter()
            .map(|n| n.kind)
            .collect();
        assert_eq!(kinds, vec!["import", "title", "image", "text", "title2"]);
    }

    /// Claims its token but reports consuming none of them.
    struct Stalled;

    impl Atom for Stalled {
        fn keyword(&self) -> &str {
            "stall"
        }

        fn tokenize(&self, _line: &str, _lines: &[&str], _index: usize) -> Tokenized {
            Tokenized::none()
        }

        fn parse(&self, token: &Token, _cursor: &TokenCursor<'_>) -> Option<Parsed> {
            token.is("stall").then(|| Parsed {
                jumped: 0,
                node: Node::text("stall", token.value.as_str()),
            })
        }

        fn render_html(&self, _node: &Node) -> Option<Markup> {
            None
        }
    }

    #[test]
    fn zero_advance_parse_still_progresses() {
        let registry = Registry::empty().with(Stalled);
        let tokens = vec![
            Token::new("stall", "a"),
            Token::new("stall", "b"),
            Token::new("text", "after"),
        ];
        assert_eq!(
            parse(&tokens, &registry),
            vec![
                Node::text("stall", "a"),
                Node::text("stall", "b"),
                Node::text("text", "after"),
            ]
        );
    }
}
