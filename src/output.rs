//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! index.sphst → index.html (Home)
//! header.sphst (importable, skipped)
//! broken.sphst FAILED: import cycle: a.sphst -> b.sphst -> a.sphst
//!
//! Built 1 page, skipped 1, failed 1 → out
//! ```
//!
//! ## Listing
//!
//! ```text
//! posts/
//! about.sphst  About us
//! notes.txt
//! ```

use crate::generate::{BuildEvent, BuildReport};
use crate::listing::ListingEntry;
use std::path::Path;

fn display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build event as one display line.
pub fn format_build_event(event: &BuildEvent) -> String {
    match event {
        BuildEvent::Written {
            source,
            output,
            title,
        } => match title {
            Some(t) if !t.is_empty() => {
                format!("{} \u{2192} {} ({})", display(source), display(output), t)
            }
            _ => format!("{} \u{2192} {}", display(source), display(output)),
        },
        BuildEvent::Skipped { source } => format!("{} (importable, skipped)", display(source)),
        BuildEvent::Failed { source, error } => format!("{} FAILED: {}", display(source), error),
    }
}

/// Closing summary of a build.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut line = format!("Built {}", plural(report.written(), "page"));
    if report.skipped() > 0 {
        line.push_str(&format!(", skipped {}", report.skipped()));
    }
    if report.failed() > 0 {
        line.push_str(&format!(", failed {}", report.failed()));
    }
    line.push_str(&format!(" \u{2192} {}", display(&report.output_dir)));
    vec![String::new(), line]
}

pub fn print_build_event(event: &BuildEvent) {
    println!("{}", format_build_event(event));
}

pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Listing
// ============================================================================

/// One line per entry: directories get a trailing `/`, documents their title.
pub fn format_listing(entries: &[ListingEntry], extension: &str) -> Vec<String> {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|entry| {
            if entry.is_dir {
                format!("{}/", entry.name)
            } else if entry.is_document(extension) && entry.importable {
                format!("{:<width$}  {} (importable)", entry.name, entry.title())
            } else if entry.is_document(extension) {
                format!("{:<width$}  {}", entry.name, entry.title())
            } else {
                entry.name.clone()
            }
        })
        .collect()
}

pub fn print_listing(entries: &[ListingEntry], extension: &str) {
    for line in format_listing(entries, extension) {
        println!("{}", line);
    }
}
