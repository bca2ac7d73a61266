//! Destination filenames for copied cover images.
//!
//! Catalog managers usually store every cover under the same leaf name
//! (Calibre writes `Author/Title (id)/cover.jpg`), so the leaf is useless as a
//! destination name. Instead the name is built from the two directories above
//! the file:
//!
//! ```text
//! /library/Jane Austen/Emma (12)/cover.jpg  →  JaneAustenEmma12.jpg
//! Ursula K. Le Guin/Lathe (3)/cover.png      →  UrsulaKLeGuinLathe3.png
//! book-default-cover.jpg                     →  .jpg
//! ```
//!
//! Both functions here are pure string/path manipulation; nothing touches the
//! filesystem.

use std::path::Path;

/// Keep only alphanumeric characters (Unicode-aware).
///
/// - `"Jane Austen"` → `"JaneAusten"`
/// - `"Emma (12)"` → `"Emma12"`
/// - `"Müller, K."` → `"MüllerK"`
pub fn safe_filename(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Derive the destination filename for a cover image source path.
///
/// The grandparent and parent directory names are concatenated, stripped to
/// alphanumerics, and the source extension is appended unchanged. A segment
/// that doesn't exist (short paths, roots, `.` and `..`) contributes nothing.
/// Two paths sharing both parent segments always map to the same name,
/// whatever their leaf filename.
pub fn cover_filename(source: &Path) -> String {
    let parent = source.parent();
    let parent_name = segment_name(parent);
    let grandparent_name = segment_name(parent.and_then(Path::parent));

    let mut name = safe_filename(&format!("{grandparent_name}{parent_name}"));
    if let Some(ext) = source.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    name
}

fn segment_name(dir: Option<&Path>) -> String {
    dir.and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
