//! External reference links for a book.
//!
//! Link building happens in two explicit steps:
//!
//! 1. [`recognized_links`] turns the raw `scheme:value,scheme:value` string into
//!    links for the schemes we know, in input order.
//! 2. [`apply_fallback`] looks at the finished list and appends an Amazon
//!    search link when nothing specific enough was found.
//!
//! | Scheme   | Link           | URL                                         |
//! |----------|----------------|---------------------------------------------|
//! | `google` | Google Books   | `https://books.google.com/books?id=<value>` |
//! | `amazon` | Amazon         | `https://www.amazon.de/dp/<value>`          |
//!
//! Any other scheme, and any token without a colon, is dropped silently.

use crate::types::{Link, LinkKind};

const GOOGLE_BOOKS_URL: &str = "https://books.google.com/books?id=";
const AMAZON_PRODUCT_URL: &str = "https://www.amazon.de/dp/";
const AMAZON_SEARCH_URL: &str = "https://www.amazon.de/gp/search?ie=UTF8&index=books&keywords=";

/// Build the complete, never-empty link list for a book.
pub fn build_links(identifiers: Option<&str>, title: Option<&str>) -> Vec<Link> {
    let links = identifiers.map(recognized_links).unwrap_or_default();
    apply_fallback(links, title)
}

/// Parse an identifiers string into links for recognized schemes.
///
/// Pairs are split on the first colon, so values may themselves contain
/// colons. Empty tokens, colon-less tokens, empty values, and unknown schemes
/// produce nothing.
pub fn recognized_links(identifiers: &str) -> Vec<Link> {
    identifiers
        .split(',')
        .filter_map(|pair| pair.split_once(':'))
        .filter_map(|(scheme, value)| link_for(scheme.trim(), value.trim()))
        .collect()
}

fn link_for(scheme: &str, value: &str) -> Option<Link> {
    if value.is_empty() {
        return None;
    }
    let (kind, base) = match scheme {
        "google" => (LinkKind::GoogleBooks, GOOGLE_BOOKS_URL),
        "amazon" => (LinkKind::Amazon, AMAZON_PRODUCT_URL),
        _ => return None,
    };
    Some(Link {
        kind,
        url: format!("{base}{value}"),
    })
}

/// Append an Amazon search link when the list is empty or holds only a
/// Google Books link.
///
/// A lone Amazon product link is considered sufficient. The title is
/// inserted as-is; escaping is left to the renderer.
pub fn apply_fallback(mut links: Vec<Link>, title: Option<&str>) -> Vec<Link> {
    let needs_search = matches!(
        links.as_slice(),
        [] | [Link {
            kind: LinkKind::GoogleBooks,
            ..
        }]
    );
    if needs_search {
        links.push(Link {
            kind: LinkKind::AmazonSearch,
            url: format!("{AMAZON_SEARCH_URL}{}", title.unwrap_or_default()),
        });
    }
    links
}
