//! End-to-end build: catalog → normalized books → page.
//!
//! [`build`] runs the three stages once, in order, and stops at the first
//! fatal error. Output written before a failure is left in place; a clean
//! rerun always reproduces a consistent result. [`check`] runs the read
//! stage only and verifies that every cover source exists.

use crate::catalog::{self, CatalogError};
use crate::config::SiteConfig;
use crate::generate::{self, GenerateError};
use crate::normalize::{self, CoverContext, NormalizeError};
use crate::types::{Book, BookRecord};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("Missing cover files: {0}")]
    MissingCovers(PathList),
}

/// Paths rendered as a comma-separated list.
#[derive(Debug, Clone, PartialEq)]
pub struct PathList(pub Vec<PathBuf>);

impl fmt::Display for PathList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    /// Written page.
    pub index_path: PathBuf,
    /// Books in page order.
    pub books: Vec<Book>,
}

impl BuildReport {
    /// Number of distinct cover files written to the output.
    pub fn cover_count(&self) -> usize {
        let mut covers: Vec<&str> = self.books.iter().map(|b| b.cover.as_str()).collect();
        covers.sort_unstable();
        covers.dedup();
        covers.len()
    }
}

/// Location of the catalog file for a library root.
pub fn catalog_path(library_root: &Path, config: &SiteConfig) -> PathBuf {
    library_root.join(&config.paths.catalog)
}

/// Stage 1 only: read the catalog records.
pub fn load_records(
    library_root: &Path,
    config: &SiteConfig,
) -> Result<Vec<BookRecord>, CatalogError> {
    catalog::read_catalog(&catalog_path(library_root, config))
}

/// Run the full pipeline.
pub fn build(
    library_root: &Path,
    output_dir: &Path,
    config: &SiteConfig,
) -> Result<BuildReport, BuildError> {
    let records = load_records(library_root, config)?;

    let ctx = CoverContext::new(library_root, output_dir, &config.paths);
    let books = normalize::normalize_all(&records, &ctx)?;

    let index_path = generate::generate(&books, config, output_dir)?;
    Ok(BuildReport { index_path, books })
}

/// Read the catalog and make sure every cover it needs is present.
///
/// Writes nothing. Each missing source is reported once, in record order.
pub fn check(
    library_root: &Path,
    output_dir: &Path,
    config: &SiteConfig,
) -> Result<Vec<BookRecord>, BuildError> {
    let records = load_records(library_root, config)?;

    let ctx = CoverContext::new(library_root, output_dir, &config.paths);
    let mut missing: Vec<PathBuf> = Vec::new();
    for record in &records {
        let source = ctx.source_path(record.cover.as_deref());
        if !source.is_file() && !missing.contains(&source) {
            missing.push(source);
        }
    }

    if missing.is_empty() {
        Ok(records)
    } else {
        Err(BuildError::MissingCovers(PathList(missing)))
    }
}
