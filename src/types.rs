//! Shared types passed between pipeline stages.
//!
//! A document flows through the compiler as `&str` → [`Token`]s → [`Node`]s →
//! HTML. Both types serialize with a `type` field so the `tokens` and `nodes`
//! CLI commands can dump them as JSON.

use serde::{Deserialize, Serialize};

/// Names of the token and node kinds the pipeline itself understands.
///
/// Directive atoms add their own keywords (`title`, `image`, ...) on top of
/// these; see [`crate::atom`].
pub mod kind {
    pub const TEXT: &str = "text";
    pub const IMPORT: &str = "import";
    pub const VARIABLE: &str = "variable";
    pub const HTML5: &str = "html5";
    pub const METATAGS: &str = "metatags";
    pub const IMPORTABLE: &str = "importable";
    pub const ALT: &str = "alt";
    pub const FRONTMATTER: &str = "frontmatter";
    pub const SCRIPT: &str = "script";
    /// Keyword of the level-1 heading atom; its first node names the page.
    pub const TITLE: &str = "title";

    pub const VAR_NAME: &str = "varName";
    pub const VAR_VALUE: &str = "varValue";
    pub const IMAGE_SRC: &str = "imageSrc";
    pub const IMAGE_ALT: &str = "imageAlt";

    /// Page flags: a whole trimmed line equal to one of these is a flag.
    pub const PAGE_FLAGS: [&str; 3] = [HTML5, METATAGS, IMPORTABLE];
}

/// One lexical unit of a document, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// Node payload: a scalar string in the common case, child nodes for
/// composite directives (image with alt, variable name/value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Children(Vec<Node>),
}

/// A parsed document element. Identity is positional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Content,
}

impl Node {
    pub fn text(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: Content::Text(text.into()),
        }
    }

    pub fn composite(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            kind: kind.into(),
            content: Content::Children(children),
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Scalar content, if this node has any.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            Content::Children(_) => None,
        }
    }

    /// Child nodes; empty for scalar nodes.
    pub fn children(&self) -> &[Node] {
        match &self.content {
            Content::Children(children) => children,
            Content::Text(_) => &[],
        }
    }

    /// Scalar content of the first child of the given kind.
    pub fn child_text(&self, kind: &str) -> Option<&str> {
        self.children()
            .iter()
            .find(|c| c.is(kind))
            .and_then(Node::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_serializes_kind_as_type() {
        let json = serde_json::to_string(&Token::new("title", "Hello")).unwrap();
        assert_eq!(json, r#"{"type":"title","value":"Hello"}"#);
    }

    #[test]
    fn scalar_node_serializes_content_as_string() {
        let json = serde_json::to_string(&Node::text("text", "hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","content":"hi"}"#);
    }

    #[test]
    fn composite_node_serializes_children() {
        let node = Node::composite(
            "image",
            vec![Node::text(kind::IMAGE_SRC, "pic.png")],
        );
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"image","content":[{"type":"imageSrc","content":"pic.png"}]}"#
        );
    }

    #[test]
    fn nodes_deserialize_both_content_shapes() {
        let nodes: Vec<Node> = serde_json::from_str(
            r#"[{"type":"text","content":"a"},{"type":"variable","content":[{"type":"varName","content":"x"}]}]"#,
        )
        .unwrap();
        assert_eq!(nodes[0].as_text(), Some("a"));
        assert_eq!(nodes[1].child_text(kind::VAR_NAME), Some("x"));
    }

    #[test]
    fn child_text_on_scalar_node_is_none() {
        let node = Node::text("title", "T");
        assert!(node.children().is_empty());
        assert_eq!(node.child_text(kind::IMAGE_SRC), None);
    }
}
