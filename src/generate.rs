//! HTML page generation.
//!
//! Stage 3 of the build. Takes the normalized books and renders the single
//! catalog page.
//!
//! ## Page Layout
//!
//! Every book is an `article.book` holding two parts:
//!
//! - **Cover** (`.book-cover`): the thumbnail, always visible.
//! - **Info panel** (`.book-info`): cover, title, authors, language, ISBN,
//!   publisher, publication date, comments and the external links. Hidden by
//!   default and shown by the `.book:hover .book-info` rule, so the page needs
//!   no JavaScript.
//!
//! Books appear in exactly the order they were given. Covers are referenced by
//! their relative path into the covers folder next to the page.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! └── covers/
//!     ├── JaneAustenEmma12.jpg
//!     └── ...
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating. All
//! catalog text is interpolated through maud and therefore escaped; a title
//! like `<script>` ends up as text. Output is fully deterministic: the same
//! books and config always produce the same bytes.

use crate::config::{self, SiteConfig};
use crate::types::Book;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Render the catalog page and write it into `output_dir`.
///
/// Returns the path of the written page.
pub fn generate(
    books: &[Book],
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<PathBuf, GenerateError> {
    fs::create_dir_all(output_dir).map_err(|source| GenerateError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let page = render_catalog(books, config);
    let index_path = output_dir.join(&config.paths.index_file);
    fs::write(&index_path, page.into_string()).map_err(|source| GenerateError::Write {
        path: index_path.clone(),
        source,
    })?;
    Ok(index_path)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, lang: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Label/value rows shown in the info panel, in display order.
fn detail_rows(book: &Book) -> [(&'static str, &str); 7] {
    fn opt(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or_default()
    }
    [
        ("Author", book.authors.as_str()),
        ("Language", opt(&book.language)),
        ("ISBN", opt(&book.isbn)),
        ("Publisher", opt(&book.publisher)),
        ("Published Date", opt(&book.pubdate)),
        ("Comments", opt(&book.comments)),
        ("Identifier", book.id.as_str()),
    ]
}

/// Renders one book: visible cover plus the hover panel.
fn render_book(book: &Book) -> Markup {
    let title = book.title.as_deref().unwrap_or_default();

    html! {
        article.book data-book-id=(book.id) {
            div.book-cover {
                img src=(book.cover) alt=(title) loading="lazy";
            }
            div.book-info {
                img.info-cover src=(book.cover) alt=(title) loading="lazy";
                h2 { (title) }
                dl {
                    @for (label, value) in detail_rows(book) {
                        dt { (label) }
                        dd { (value) }
                    }
                    dt { "Links" }
                    dd {
                        ul.book-links {
                            @for link in &book.links {
                                li {
                                    a href=(link.url) target="_blank" rel="noopener" { (link.name()) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the full catalog page.
pub fn render_catalog(books: &[Book], config: &SiteConfig) -> Markup {
    let css = format!(
        "{}\n\n{}",
        config::generate_theme_css(&config.theme, &config.colors),
        CSS_STATIC
    );

    let content = html! {
        h1.page-title { (config.page.title) }
        main.book-grid {
            @for book in books {
                (render_book(book))
            }
        }
    };

    base_document(&config.page.title, &config.page.lang, &css, content)
}

// ============================================================================
// Tests
// ============================================================================
