//! Catalog XML reading.
//!
//! Stage 1 of the build. Reads a catalog export and produces one
//! [`BookRecord`] per `<record>` element, in document order. The expected
//! shape is Calibre's `calibredb catalog books.xml` output:
//!
//! ```xml
//! <calibredb>
//!   <record>
//!     <id>12</id>
//!     <title>Emma</title>
//!     <authors><author>Jane Austen</author></authors>
//!     <languages>eng</languages>
//!     <cover>/library/Jane Austen/Emma (12)/cover.jpg</cover>
//!     <identifiers>google:Ll8LAQAAMAAJ,isbn:9780141439587</identifiers>
//!     ...
//!   </record>
//! </calibredb>
//! ```
//!
//! Each record is first collected into a small [`Element`] tree, then mapped
//! onto a `BookRecord` through the [`RECORD_FIELDS`] table. Every field but
//! `id` is optional; a missing or empty element simply yields `None`.
//!
//! Anything that isn't well-formed XML aborts the whole read. There is no
//! partial-catalog recovery.

use crate::types::BookRecord;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const RECORD_TAG: &str = "record";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed catalog {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Why a catalog document could not be turned into records.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("unknown or invalid entity &{0};")]
    UnknownEntity(String),
    #[error("record {record} has no <id>")]
    MissingId { record: usize },
    #[error("document has no root element")]
    NoRoot,
    #[error("content outside the root element at byte {0}")]
    OutsideRoot(u64),
}

/// A parsed XML element inside a record.
///
/// Only what the catalog needs is kept: the local name, the concatenated
/// direct text content, and child elements. Attributes are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Trimmed text content, or `None` when empty or whitespace-only.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    /// All descendants matching a slash-separated child path, in document
    /// order. `"authors/author"` yields every `<author>` of every `<authors>`.
    pub fn find_all<'a>(&'a self, path: &str) -> std::vec::IntoIter<&'a Element> {
        let mut matches: Vec<&'a Element> = vec![self];
        for segment in path.split('/') {
            matches = matches
                .into_iter()
                .flat_map(|el| el.children.iter().filter(|c| c.name == segment))
                .collect();
        }
        matches.into_iter()
    }

    /// First descendant matching a child path.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).next()
    }

    /// Text of the first descendant matching a child path.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(Element::text)
    }
}

type FieldSlot = fn(&mut BookRecord) -> &mut Option<String>;

/// Optional single-valued record fields: element name → `BookRecord` field.
pub const RECORD_FIELDS: &[(&str, FieldSlot)] = &[
    ("title", |r| &mut r.title),
    ("languages", |r| &mut r.language),
    ("publisher", |r| &mut r.publisher),
    ("isbn", |r| &mut r.isbn),
    ("comments", |r| &mut r.comments),
    ("pubdate", |r| &mut r.pubdate),
    ("cover", |r| &mut r.cover),
    ("identifiers", |r| &mut r.identifiers),
];

/// Read and parse the catalog file at `path`.
pub fn read_catalog(path: &Path) -> Result<Vec<BookRecord>, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&content).map_err(|source| CatalogError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse catalog XML into records, preserving document order.
///
/// `<record>` elements are collected at any depth. A `<record>` nested inside
/// another record is treated as an ordinary child element of the outer one.
pub fn parse_catalog(xml: &str) -> Result<Vec<BookRecord>, ParseError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);

    // Names of every currently open element, used to detect truncation.
    let mut open: Vec<String> = Vec::new();
    // The record being built: stack[0] is the <record>, the rest its open descendants.
    let mut stack: Vec<Element> = Vec::new();
    let mut records = Vec::new();
    let mut root_seen = false;

    loop {
        let event = reader.read_event();
        if open.is_empty() {
            let outside = match &event {
                Ok(Event::Start(_) | Event::Empty(_)) => root_seen,
                Ok(Event::Text(e)) => !String::from_utf8_lossy(e.as_ref()).trim().is_empty(),
                Ok(Event::CData(_) | Event::GeneralRef(_)) => true,
                _ => false,
            };
            if outside {
                return Err(ParseError::OutsideRoot(reader.buffer_position()));
            }
        }

        match event {
            Ok(Event::Start(e)) => {
                root_seen = true;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if !stack.is_empty() || name == RECORD_TAG {
                    stack.push(Element::new(name.clone()));
                }
                open.push(name);
            }
            Ok(Event::Empty(e)) => {
                root_seen = true;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let element = Element::new(name);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if element.name == RECORD_TAG => {
                        let record = record_from_element(&element, records.len() + 1)?;
                        records.push(record);
                    }
                    None => {}
                }
            }
            Ok(Event::End(_)) => {
                open.pop();
                if let Some(done) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(done),
                        None => {
                            let record = record_from_element(&done, records.len() + 1)?;
                            records.push(record);
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref()).into_owned();
                let resolved =
                    resolve_entity(&entity).ok_or_else(|| ParseError::UnknownEntity(entity))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push(resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(source) => {
                return Err(ParseError::Xml {
                    position: reader.error_position(),
                    source,
                });
            }
            _ => {}
        }
    }

    if let Some(name) = open.pop() {
        return Err(ParseError::Unclosed(name));
    }
    if !root_seen {
        return Err(ParseError::NoRoot);
    }
    Ok(records)
}

/// Map a `<record>` element onto a [`BookRecord`]. `position` is 1-based.
fn record_from_element(element: &Element, position: usize) -> Result<BookRecord, ParseError> {
    let id = element
        .find("id")
        .ok_or(ParseError::MissingId { record: position })?;

    let mut record = BookRecord {
        id: id.text().unwrap_or_default().to_string(),
        authors: element
            .find_all("authors/author")
            .filter_map(Element::text)
            .map(String::from)
            .collect(),
        ..Default::default()
    };
    for (name, slot) in RECORD_FIELDS {
        *slot(&mut record) = element.find_text(name).map(String::from);
    }
    Ok(record)
}

/// Resolve a predefined XML entity or a numeric character reference.
///
/// References to characters outside the XML `Char` range are rejected.
fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => return Some('\''),
        "quot" => return Some('"'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "amp" => return Some('&'),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };
    char::from_u32(code).filter(|&c| is_xml_char(c))
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || c >= '\u{10000}'
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<calibredb>
  <record>
    <id>12</id>
    <uuid>0c2d1b4e</uuid>
    <title sort="Emma">Emma</title>
    <authors sort="Austen, Jane">
      <author>Jane Austen</author>
    </authors>
    <publisher>Penguin</publisher>
    <isbn>9780141439587</isbn>
    <identifiers>google:Ll8LAQAAMAAJ,isbn:9780141439587</identifiers>
    <languages>eng</languages>
    <pubdate>1815-12-23T00:00:00+00:00</pubdate>
    <comments>&lt;p&gt;A comedy of manners.&lt;/p&gt;</comments>
    <cover>/library/Jane Austen/Emma (12)/cover.jpg</cover>
    <tags><tag>Classics</tag></tags>
  </record>
  <record>
    <id>13</id>
    <title>Good Omens</title>
    <authors>
      <author>Terry Pratchett</author>
      <author>Neil Gaiman</author>
    </authors>
  </record>
</calibredb>
"#;

    #[test]
    fn parses_records_in_document_order() {
        let records = parse_catalog(SAMPLE).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["12", "13"]);
    }

    #[test]
    fn extracts_all_known_fields() {
        let records = parse_catalog(SAMPLE).unwrap();
        let emma = &records[0];
        assert_eq!(emma.title.as_deref(), Some("Emma"));
        assert_eq!(emma.authors, vec!["Jane Austen"]);
        assert_eq!(emma.publisher.as_deref(), Some("Penguin"));
        assert_eq!(emma.isbn.as_deref(), Some("9780141439587"));
        assert_eq!(emma.language.as_deref(), Some("eng"));
        assert_eq!(emma.pubdate.as_deref(), Some("1815-12-23T00:00:00+00:00"));
        assert_eq!(
            emma.cover.as_deref(),
            Some("/library/Jane Austen/Emma (12)/cover.jpg")
        );
        assert_eq!(
            emma.identifiers.as_deref(),
            Some("google:Ll8LAQAAMAAJ,isbn:9780141439587")
        );
    }

    #[test]
    fn entities_are_resolved() {
        let records = parse_catalog(SAMPLE).unwrap();
        assert_eq!(
            records[0].comments.as_deref(),
            Some("<p>A comedy of manners.</p>")
        );
    }

    #[test]
    fn authors_keep_document_order() {
        let records = parse_catalog(SAMPLE).unwrap();
        assert_eq!(records[1].authors, vec!["Terry Pratchett", "Neil Gaiman"]);
    }

    #[test]
    fn absent_fields_are_none() {
        let records = parse_catalog(SAMPLE).unwrap();
        let omens = &records[1];
        assert_eq!(omens.cover, None);
        assert_eq!(omens.identifiers, None);
        assert_eq!(omens.publisher, None);
        assert_eq!(omens.comments, None);
    }

    #[test]
    fn empty_elements_are_none() {
        let xml = "<c><record><id>1</id><title></title><publisher/><isbn>  </isbn></record></c>";
        let records = parse_catalog(xml).unwrap();
        assert_eq!(records[0].title, None);
        assert_eq!(records[0].publisher, None);
        assert_eq!(records[0].isbn, None);
    }

    #[test]
    fn empty_authors_are_skipped() {
        let xml = "<c><record><id>1</id><authors><author/><author>A</author></authors></record></c>";
        let records = parse_catalog(xml).unwrap();
        assert_eq!(records[0].authors, vec!["A"]);
    }

    #[test]
    fn numeric_references_and_cdata() {
        let xml = "<c><record><id>1</id><title>Caf&#233; &#x263A;</title>\
                   <comments><![CDATA[<b>bold</b>]]></comments></record></c>";
        let records = parse_catalog(xml).unwrap();
        assert_eq!(records[0].title.as_deref(), Some("Café ☺"));
        assert_eq!(records[0].comments.as_deref(), Some("<b>bold</b>"));
    }

    #[test]
    fn empty_catalog_has_no_records() {
        assert!(parse_catalog("<calibredb/>").unwrap().is_empty());
        assert!(parse_catalog("<calibredb></calibredb>").unwrap().is_empty());
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let xml = "\u{feff}<c><record><id>1</id></record></c>";
        assert_eq!(parse_catalog(xml).unwrap().len(), 1);
    }

    #[test]
    fn missing_id_is_fatal() {
        let xml = "<c><record><id>1</id></record><record><title>x</title></record></c>";
        let err = parse_catalog(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingId { record: 2 }));
    }

    #[test]
    fn mismatched_end_tag_is_fatal() {
        let xml = "<c><record><id>1</title></record></c>";
        assert!(matches!(
            parse_catalog(xml).unwrap_err(),
            ParseError::Xml { .. }
        ));
    }

    #[test]
    fn truncated_document_is_fatal() {
        let xml = "<c><record><id>1</id>";
        match parse_catalog(xml).unwrap_err() {
            ParseError::Unclosed(name) => assert_eq!(name, "record"),
            other => panic!("expected Unclosed, got {other:?}"),
        }
    }

    #[test]
    fn unknown_entity_is_fatal() {
        let xml = "<c><record><id>1</id><title>&nbsp;</title></record></c>";
        assert!(matches!(
            parse_catalog(xml).unwrap_err(),
            ParseError::UnknownEntity(name) if name == "nbsp"
        ));
    }

    #[test]
    fn document_without_root_is_fatal() {
        for xml in ["", "  \n ", "<?xml version='1.0'?>\n<!-- nothing -->"] {
            assert!(
                matches!(parse_catalog(xml).unwrap_err(), ParseError::NoRoot),
                "{xml:?}"
            );
        }
    }

    #[test]
    fn plain_text_is_fatal() {
        assert!(matches!(
            parse_catalog("not xml").unwrap_err(),
            ParseError::OutsideRoot(_)
        ));
    }

    #[test]
    fn second_root_element_is_fatal() {
        for xml in ["<a/><b/>", "<c><record><id>1</id></record></c><c/>"] {
            assert!(
                matches!(parse_catalog(xml).unwrap_err(), ParseError::OutsideRoot(_)),
                "{xml:?}"
            );
        }
    }

    #[test]
    fn text_after_root_is_fatal() {
        let xml = "<c><record><id>1</id></record></c>trailing";
        assert!(matches!(
            parse_catalog(xml).unwrap_err(),
            ParseError::OutsideRoot(_)
        ));
    }

    #[test]
    fn whitespace_and_comments_around_root_are_fine() {
        let xml = "<?xml version='1.0'?>\n<!-- export -->\n<c><record><id>1</id></record></c>\n\n";
        assert_eq!(parse_catalog(xml).unwrap().len(), 1);
    }

    #[test]
    fn references_to_forbidden_characters_are_fatal() {
        for reference in ["&#0;", "&#x1;", "&#xFFFE;", "&#xD800;", "&#1114112;"] {
            let xml = format!("<c><record><id>1</id><title>{reference}</title></record></c>");
            assert!(
                matches!(parse_catalog(&xml).unwrap_err(), ParseError::UnknownEntity(_)),
                "{reference}"
            );
        }
        let ok = "<c><record><id>1</id><title>a&#9;b&#x10000;</title></record></c>";
        assert_eq!(
            parse_catalog(ok).unwrap()[0].title.as_deref(),
            Some("a\tb\u{10000}")
        );
    }

    #[test]
    fn read_catalog_missing_file_names_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("books.xml");
        let err = read_catalog(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(err.to_string().contains("books.xml"));
    }

    #[test]
    fn read_catalog_malformed_names_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("books.xml");
        fs::write(&path, "<c><record>").unwrap();
        let err = read_catalog(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
        assert!(err.to_string().contains("books.xml"));
    }

    // =========================================================================
    // Element lookups
    // =========================================================================

    fn leaf(name: &str, text: &str) -> Element {
        Element {
            name: name.to_string(),
            text: text.to_string(),
            children: vec![],
        }
    }

    #[test]
    fn find_all_walks_nested_paths() {
        let record = Element {
            name: "record".to_string(),
            text: String::new(),
            children: vec![
                Element {
                    name: "authors".to_string(),
                    text: "\n  ".to_string(),
                    children: vec![leaf("author", "A"), leaf("author", "B")],
                },
                leaf("title", "T"),
            ],
        };
        let names: Vec<&str> = record
            .find_all("authors/author")
            .filter_map(Element::text)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(record.find_text("title"), Some("T"));
        assert_eq!(record.find_text("authors"), None);
        assert!(record.find("missing/path").is_none());
    }

    #[test]
    fn record_fields_table_covers_every_optional_field() {
        let names: Vec<&str> = RECORD_FIELDS.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![
                "title",
                "languages",
                "publisher",
                "isbn",
                "comments",
                "pubdate",
                "cover",
                "identifiers"
            ]
        );
    }
}
