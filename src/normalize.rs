//! Record normalization.
//!
//! Stage 2 of the build. Turns each raw [`BookRecord`] into a renderable
//! [`Book`]:
//!
//! - authors are joined into one display string;
//! - the cover image (or the configured placeholder when the record has none)
//!   is copied into the output's cover folder under a name derived by
//!   [`naming::cover_filename`];
//! - the external link list is built by [`links::build_links`].
//!
//! Records are handled strictly one after another. The first cover that
//! can't be copied aborts the run.

use crate::config::PathsConfig;
use crate::links;
use crate::naming;
use crate::types::{Book, BookRecord};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Failed to create cover directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to copy cover {} to {}: {source}", .from.display(), .to.display())]
    CopyCover {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where covers come from and where they go.
#[derive(Debug, Clone, Copy)]
pub struct CoverContext<'a> {
    /// Directory relative cover paths and the placeholder resolve against.
    pub library_root: &'a Path,
    /// Output directory; covers land in `output_dir/<covers_dir>/`.
    pub output_dir: &'a Path,
    pub paths: &'a PathsConfig,
}

impl<'a> CoverContext<'a> {
    pub fn new(library_root: &'a Path, output_dir: &'a Path, paths: &'a PathsConfig) -> Self {
        Self {
            library_root,
            output_dir,
            paths,
        }
    }

    /// The cover path as written: the record's own, or the placeholder.
    pub fn written_path<'r>(&self, cover: Option<&'r str>) -> &'r str
    where
        'a: 'r,
    {
        let paths: &'a PathsConfig = self.paths;
        cover.unwrap_or(&paths.default_cover)
    }

    /// Filesystem location of a cover source.
    pub fn source_path(&self, cover: Option<&str>) -> PathBuf {
        self.library_root.join(self.written_path(cover))
    }

    /// Directory receiving cover copies.
    pub fn covers_dir(&self) -> PathBuf {
        self.output_dir.join(&self.paths.covers_dir)
    }
}

/// Join author names for display: `"A, B, C"`, or `""` for none.
pub fn join_authors(authors: &[String]) -> String {
    authors.join(", ")
}

/// Normalize every record in order, stopping at the first failure.
pub fn normalize_all(
    records: &[BookRecord],
    ctx: &CoverContext,
) -> Result<Vec<Book>, NormalizeError> {
    records
        .iter()
        .map(|record| normalize_record(record, ctx))
        .collect()
}

/// Normalize one record, copying its cover into the output directory.
pub fn normalize_record(record: &BookRecord, ctx: &CoverContext) -> Result<Book, NormalizeError> {
    let cover = copy_cover(record.cover.as_deref(), ctx)?;

    Ok(Book {
        id: record.id.clone(),
        title: record.title.clone(),
        authors: join_authors(&record.authors),
        language: record.language.clone(),
        publisher: record.publisher.clone(),
        isbn: record.isbn.clone(),
        comments: record.comments.clone(),
        pubdate: record.pubdate.clone(),
        cover,
        links: links::build_links(record.identifiers.as_deref(), record.title.as_deref()),
    })
}

/// Copy a record's cover (or the placeholder) into the covers folder.
///
/// Returns the path relative to the output directory, with `/` separators
/// so it can go straight into an `src` attribute. An existing file with the
/// same derived name is overwritten.
pub fn copy_cover(cover: Option<&str>, ctx: &CoverContext) -> Result<String, NormalizeError> {
    let written = ctx.written_path(cover);
    let file_name = naming::cover_filename(Path::new(written));

    let covers_dir = ctx.covers_dir();
    fs::create_dir_all(&covers_dir).map_err(|source| NormalizeError::CreateDir {
        path: covers_dir.clone(),
        source,
    })?;

    let from = ctx.source_path(cover);
    let to = covers_dir.join(&file_name);
    copy_with_times(&from, &to).map_err(|source| NormalizeError::CopyCover {
        from: from.clone(),
        to: to.clone(),
        source,
    })?;

    Ok(format!("{}/{}", ctx.paths.covers_dir, file_name))
}

/// Copy contents, access/modification times and permissions.
///
/// Times and permissions are applied through the handle used for writing, so
/// a read-only source still yields a complete copy. An existing destination is
/// replaced rather than written through, since an earlier copy may itself be
/// read-only.
fn copy_with_times(from: &Path, to: &Path) -> io::Result<()> {
    let mut source = fs::File::open(from)?;
    let meta = source.metadata()?;

    match fs::remove_file(to) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    let mut dest = fs::File::create(to)?;
    io::copy(&mut source, &mut dest)?;

    let mut times = fs::FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    dest.set_times(times)?;
    dest.set_permissions(meta.permissions())
}
