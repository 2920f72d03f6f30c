//! # Sophist
//!
//! A compiler for `.sphst`, a small line-oriented markup language, to HTML.
//!
//! ```text
//! html5
//! metatags
//! import header
//! import site.css
//! frontmatter {"description": "Notes from the field"}
//!
//! title Field notes
//! date 2024-05-01
//!
//! Paragraphs are plain lines. Consecutive lines join
//! into one paragraph until a blank line.
//!
//! image heron.jpg
//! 	alt A grey heron
//! ```
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! text ─tokenize→ tokens ─parse→ nodes ─import→ nodes ─render→ HTML
//! ```
//!
//! No stage mutates an earlier stage's output. Directives are pluggable
//! [`atom::Atom`]s held in an ordered [`atom::Registry`]; the pipeline only
//! knows the page-level built-ins (`html5`, `metatags`, `importable`,
//! `import`, `var`, `frontmatter`, `script`).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Token` and `Node`, the data passed between stages |
//! | [`atom`] | Directive trait, registry, builtin directives (`title`..`title6`, `date`, `image`, `markdown`) |
//! | [`tokenize`] | Lines → tokens |
//! | [`parse`] | Tokens → nodes |
//! | [`import`] | Transclusion of other documents, stylesheet references, cycle detection |
//! | [`render`] | Nodes → HTML body or full page (Maud) |
//! | [`frontmatter`] | JSON metadata blocks |
//! | [`host`] | Sandboxed capability `script` blocks run against |
//! | [`listing`] | Directory listings annotated with frontmatter |
//! | [`compile`] | One document end to end |
//! | [`scan`] | Discover documents under a path |
//! | [`generate`] | Parallel directory builds with mirrored output |
//! | [`config`] | `sophist.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Leniency
//!
//! A document always compiles. Unknown keywords are text, missing imports
//! expand to nothing, malformed frontmatter is an empty mapping, failing
//! scripts contribute what they appended before failing. Each of these logs
//! a warning through `tracing`. Only an unreadable top-level document and an
//! import cycle fail a compile.
//!
//! ## Scripts Never Evaluate Code
//!
//! `script` blocks are handed to a [`host::ScriptHost`], which sees only a
//! [`host::HostContext`]: append to head or body, read frontmatter and
//! variables, list a directory below the document. The crate ships a
//! one-call-per-line host and nothing that executes arbitrary code.
//!
//! ## Maud For Every Template
//!
//! Directive output and the page shell are [Maud](https://maud.lambda.xyz/)
//! templates, so attribute values are always escaped. Directive text content
//! is interposed raw (`PreEscaped`): documents may carry inline HTML.

pub mod atom;
pub mod compile;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod host;
pub mod import;
pub mod listing;
pub mod output;
pub mod parse;
pub mod render;
pub mod scan;
pub mod tokenize;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
