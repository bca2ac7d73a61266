//! CLI output formatting for the `check`, `scan` and `build` commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every book leads with
//! its positional index and title; paths and identifiers follow as indented
//! context lines. The result reads as an inventory of the shelf while still
//! letting users trace a cover back to its file.
//!
//! # Output Format
//!
//! ## Catalog (check)
//!
//! ```text
//! 001 Emma
//!     Authors: Jane Austen
//!     Cover: Jane Austen/Emma (12)/cover.jpg
//!     Identifiers: isbn:9780141439587,google:Ll8LAQAAMAAJ
//!     Emma Woodhouse, handsome, clever, and rich.
//! 002 (id 40)
//!     Cover: (placeholder)
//! 2 records
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 Emma → covers/JaneAustenEmma12.jpg
//!     Links: Google Books, Amazon Search
//! 002 (id 40) → covers/.jpg
//!     Links: Amazon Search
//! Generated dist/index.html with 2 books, 2 cover files
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::BuildReport;
use crate::types::{Book, BookRecord, Link};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a book header: titled books show the title, untitled ones the id
/// in parens.
///
/// ```text
/// 001 Emma          // titled
/// 002 (id 40)       // untitled, the id IS the identity
/// ```
fn entity_header(index: usize, title: Option<&str>, id: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} (id {})", format_index(index), id),
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
///
/// Catalog comments are usually HTML fragments.
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

fn link_labels(links: &[Link]) -> String {
    links.iter().map(Link::name).collect::<Vec<_>>().join(", ")
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Catalog output (check)
// ============================================================================

/// Format the records read from the catalog.
pub fn format_catalog_output(records: &[BookRecord]) -> Vec<String> {
    let mut lines = Vec::new();
    let ctx = indent(1);

    for (i, record) in records.iter().enumerate() {
        lines.push(entity_header(i + 1, record.title.as_deref(), &record.id));

        if !record.authors.is_empty() {
            lines.push(format!("{}Authors: {}", ctx, record.authors.join(", ")));
        }
        match &record.cover {
            Some(cover) => lines.push(format!("{}Cover: {}", ctx, cover)),
            None => lines.push(format!("{}Cover: (placeholder)", ctx)),
        }
        if let Some(ref ids) = record.identifiers {
            lines.push(format!("{}Identifiers: {}", ctx, ids));
        }
        if let Some(ref comments) = record.comments {
            let plain = strip_html_tags(comments);
            let truncated = truncate_desc(plain.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("{}{}", ctx, truncated));
            }
        }
    }

    lines.push(plural(records.len(), "record", "records"));
    lines
}

/// Print catalog output to stdout.
pub fn print_catalog_output(records: &[BookRecord]) {
    for line in format_catalog_output(records) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

fn book_lines(index: usize, book: &Book) -> [String; 2] {
    [
        format!(
            "{} \u{2192} {}",
            entity_header(index, book.title.as_deref(), &book.id),
            book.cover
        ),
        format!("{}Links: {}", indent(1), link_labels(&book.links)),
    ]
}

/// Format build output: every rendered book, then a summary line.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .books
        .iter()
        .enumerate()
        .flat_map(|(i, book)| book_lines(i + 1, book))
        .collect();

    lines.push(format!(
        "Generated {} with {}, {}",
        report.index_path.display(),
        plural(report.books.len(), "book", "books"),
        plural(report.cover_count(), "cover file", "cover files"),
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
