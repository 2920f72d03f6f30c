//! Line scanner: document text → flat [`Token`] sequence.
//!
//! One cursor walks the lines front to back, never backtracking. At each
//! non-blank line, in priority order:
//!
//! 1. page flags (`html5`, `metatags`, `importable`) as whole lines
//! 2. `import <path>` and `var <name> <value>`
//! 3. a `frontmatter` object, a `script` block
//! 4. registered atoms, first match wins
//! 5. otherwise a text run: this line plus following non-blank lines, trimmed
//!    and joined with spaces
//!
//! A text run stops at a blank line and at any line that steps 1 to 4 would
//! claim, so a heading written directly under a paragraph still becomes a
//! heading.

use crate::atom::{Registry, Tokenized, indented_block, line_argument};
use crate::frontmatter;
use crate::types::{Token, kind};

pub fn tokenize(source: &str, registry: &Registry) -> Vec<Token> {
    let lines: Vec<&str> = source.lines().collect();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index].trim();
        if line.is_empty() {
            index += 1;
            continue;
        }

        if let Some(claim) = claim_line(line, &lines, index, registry) {
            index += advance(claim.jumped, line);
            tokens.extend(claim.tokens);
            continue;
        }

        let mut run = vec![line];
        index += 1;
        while let Some(next) = lines.get(index).map(|l| l.trim()) {
            if next.is_empty() || claim_line(next, &lines, index, registry).is_some() {
                break;
            }
            run.push(next);
            index += 1;
        }
        tokens.push(Token::new(kind::TEXT, run.join(" ")));
    }

    tokens
}

fn claim_line(line: &str, lines: &[&str], index: usize, registry: &Registry) -> Option<Tokenized> {
    builtin(line, lines, index).or_else(|| registry.tokenize(line, lines, index))
}

fn builtin(line: &str, lines: &[&str], index: usize) -> Option<Tokenized> {
    if kind::PAGE_FLAGS.contains(&line) {
        return Some(single(line, "true"));
    }
    if let Some(path) = line_argument("import", line) {
        return Some(single(kind::IMPORT, path));
    }
    if let Some(var) = line_argument("var", line) {
        return Some(single(kind::VARIABLE, var));
    }
    if let Some((object, spanned)) = frontmatter::capture(lines, index) {
        return Some(Tokenized {
            jumped: spanned,
            tokens: vec![Token::new(kind::FRONTMATTER, object)],
        });
    }
    if line == kind::SCRIPT {
        let (body, spanned) = indented_block(lines, index + 1);
        if !body.is_empty() {
            return Some(Tokenized {
                jumped: 1 + spanned,
                tokens: vec![Token::new(kind::SCRIPT, body.join("\n"))],
            });
        }
    }
    None
}

fn single(kind: &str, value: &str) -> Tokenized {
    Tokenized {
        jumped: 1,
        tokens: vec![Token::new(kind, value)],
    }
}

/// A claim that consumes nothing would stall the cursor.
fn advance(jumped: usize, line: &str) -> usize {
    if jumped == 0 {
        tracing::warn!(line, "Directive matched without consuming input; skipping line");
        1
    } else {
        jumped
    }
}
