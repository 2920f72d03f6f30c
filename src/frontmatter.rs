//! Document frontmatter: a JSON object following the `frontmatter` marker.
//!
//! ```text
//! frontmatter {
//!     "title": "Field notes",
//!     "description": "Things seen on walks",
//!     "tags": ["birds", { "nested": true }]
//! }
//! ```
//!
//! The object may start on the marker line or on the next one and may span
//! any number of lines. It is read with `serde_json`'s streaming deserializer,
//! so nested braces and braces inside strings are handled; anything after the
//! closing brace on the same line is ignored.
//!
//! Frontmatter never fails a build: a marker without a valid object is left
//! for the tokenizer to treat as text, and [`extract_frontmatter`] returns an
//! empty mapping when nothing matches.

use serde_json::Value;
use std::collections::BTreeMap;

pub const MARKER: &str = "frontmatter";

/// Metadata mapping; ordered so output built from it is deterministic.
pub type Frontmatter = BTreeMap<String, Value>;

/// Capture the frontmatter object whose marker is on `lines[index]`.
///
/// Returns the object's JSON text and the number of lines it spans,
/// counting the marker line.
pub fn capture(lines: &[&str], index: usize) -> Option<(String, usize)> {
    let marker_line = lines.get(index)?.trim();
    let rest = if marker_line == MARKER {
        ""
    } else {
        marker_line.strip_prefix(MARKER)?.strip_prefix(' ')?
    };

    let mut text = rest.to_string();
    for line in &lines[index + 1..] {
        text.push('\n');
        text.push_str(line);
    }

    let skipped = text.len() - text.trim_start().len();
    let body = &text[skipped..];
    if !body.starts_with('{') {
        return None;
    }

    let mut stream = serde_json::Deserializer::from_str(body).into_iter::<Value>();
    let Some(Ok(Value::Object(_))) = stream.next() else {
        return None;
    };
    let end = stream.byte_offset();
    let spanned = 1 + text[..skipped + end].matches('\n').count();
    Some((body[..end].to_string(), spanned))
}

/// Parse captured frontmatter text. Invalid input yields an empty mapping.
pub fn parse(text: &str) -> Frontmatter {
    serde_json::from_str(text).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring malformed frontmatter");
        Frontmatter::new()
    })
}

/// Best-effort scan of a whole document for its first frontmatter block.
pub fn extract_frontmatter(source: &str) -> Frontmatter {
    let lines: Vec<&str> = source.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with(MARKER))
        .find_map(|(index, _)| capture(&lines, index))
        .map(|(text, _)| parse(&text))
        .unwrap_or_default()
}

/// `title` entry, when it is a string.
pub fn title(frontmatter: &Frontmatter) -> Option<&str> {
    frontmatter.get("title").and_then(Value::as_str)
}

/// `description` entry, when it is a string.
pub fn description(frontmatter: &Frontmatter) -> Option<&str> {
    frontmatter.get("description").and_then(Value::as_str)
}
