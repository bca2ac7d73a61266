//! Shared types passed between pipeline stages.
//!
//! [`BookRecord`] is what the catalog reader produces; [`Book`] is what the
//! normalizer hands to the page renderer. Neither outlives a single run.

use serde::Serialize;

/// A raw book entry as read from the catalog.
///
/// Every field except `id` is optional in the source XML. Absent and empty
/// elements both arrive here as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `authors/author` values in document order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubdate: Option<String>,
    /// Cover image path exactly as written in the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// Raw `scheme:value,scheme:value` string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<String>,
}

/// A book ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub id: String,
    pub title: Option<String>,
    /// Author names joined with `", "`; empty when the record has none.
    pub authors: String,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub comments: Option<String>,
    pub pubdate: Option<String>,
    /// Path of the copied cover relative to the output directory, e.g.
    /// `covers/JaneAustenEmma12.jpg`. Always forward slashes.
    pub cover: String,
    /// Never empty.
    pub links: Vec<Link>,
}

/// Which external destination a [`Link`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkKind {
    GoogleBooks,
    Amazon,
    AmazonSearch,
}

impl LinkKind {
    /// Display name used as the anchor text.
    pub fn label(self) -> &'static str {
        match self {
            LinkKind::GoogleBooks => "Google Books",
            LinkKind::Amazon => "Amazon",
            LinkKind::AmazonSearch => "Amazon Search",
        }
    }
}

/// An external reference link shown in a book's metadata panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub kind: LinkKind,
    pub url: String,
}

impl Link {
    pub fn name(&self) -> &'static str {
        self.kind.label()
    }
}
