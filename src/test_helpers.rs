//! Shared test utilities for the bookwall test suite.
//!
//! Provides a fixture library plus lookup helpers and bulk extractors that
//! work with normalized [`Book`]s.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let lib = setup_library();
//! let out = TempDir::new().unwrap();
//! let report = build(lib.path(), out.path(), &SiteConfig::default()).unwrap();
//!
//! let emma = find_book(&report.books, "12");
//! assert_eq!(link_kinds(emma), vec![LinkKind::GoogleBooks, LinkKind::AmazonSearch]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::types::{Book, LinkKind};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/library/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_library() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/library");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups, panics with a clear message on miss
// =========================================================================

/// Find a book by catalog id. Panics if not found.
pub fn find_book<'a>(books: &'a [Book], id: &str) -> &'a Book {
    books.iter().find(|b| b.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
        panic!("book '{id}' not found. Available: {ids:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All book titles in page order; untitled books yield `""`.
pub fn book_titles(books: &[Book]) -> Vec<&str> {
    books
        .iter()
        .map(|b| b.title.as_deref().unwrap_or_default())
        .collect()
}

/// Link kinds of one book, in display order.
pub fn link_kinds(book: &Book) -> Vec<LinkKind> {
    book.links.iter().map(|l| l.kind).collect()
}
