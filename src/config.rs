//! Site configuration module.
//!
//! Handles loading, validating, and merging `bookwall.toml`. The file lives in
//! the library root next to the catalog and is entirely optional: every key has
//! a stock default, and a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! catalog = "books.xml"                    # Catalog export, relative to the library root
//! default_cover = "book-default-cover.jpg" # Placeholder for records without a cover
//! covers_dir = "covers"                    # Cover subfolder inside the output directory
//! index_file = "index.html"                # Generated page inside the output directory
//!
//! [page]
//! title = "Book Catalog"
//! lang = "en"
//!
//! [theme]
//! cover_width = "200px"
//! cover_height = "300px"
//! gap = "10px"              # Margin around each cover
//! panel_max_width = "400px" # Width cap of the hover panel
//!
//! [colors]
//! panel_background = "#f9f9f9"
//! panel_border = "#cccccc"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

/// Name of the config file looked up in the library root.
pub const CONFIG_FILE: &str = "bookwall.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `bookwall.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Input and output locations.
    pub paths: PathsConfig,
    /// Page-level text.
    pub page: PageConfig,
    /// Grid and panel dimensions.
    pub theme: ThemeConfig,
    /// Hover panel colors.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = &self.paths;
        for (key, value) in [
            ("paths.catalog", &paths.catalog),
            ("paths.default_cover", &paths.default_cover),
            ("paths.covers_dir", &paths.covers_dir),
            ("paths.index_file", &paths.index_file),
            ("page.title", &self.page.title),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if !is_single_segment(&paths.covers_dir) {
            return Err(ConfigError::Validation(
                "paths.covers_dir must be a single directory name".into(),
            ));
        }
        if !is_single_segment(&paths.index_file) {
            return Err(ConfigError::Validation(
                "paths.index_file must be a plain filename".into(),
            ));
        }
        // Theme values are written into the page's <style> block unescaped.
        let (theme, colors) = (&self.theme, &self.colors);
        for (key, value) in [
            ("theme.cover_width", &theme.cover_width),
            ("theme.cover_height", &theme.cover_height),
            ("theme.gap", &theme.gap),
            ("theme.panel_max_width", &theme.panel_max_width),
            ("colors.panel_background", &colors.panel_background),
            ("colors.panel_border", &colors.panel_border),
        ] {
            if value.contains('<') {
                return Err(ConfigError::Validation(format!(
                    "{key} must not contain '<'"
                )));
            }
        }
        Ok(())
    }
}

/// True for a plain relative name like `covers`: one normal component.
fn is_single_segment(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !value.contains(['/', '\\'])
}

/// Input and output locations.
///
/// `catalog` and `default_cover` are resolved against the library root;
/// `covers_dir` and `index_file` against the output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Catalog XML export.
    pub catalog: String,
    /// Placeholder image used for records without a cover path.
    pub default_cover: String,
    /// Subfolder of the output directory receiving cover copies.
    pub covers_dir: String,
    /// Filename of the generated page.
    pub index_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: "books.xml".to_string(),
            default_cover: "book-default-cover.jpg".to_string(),
            covers_dir: "covers".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

/// Page-level text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Document `<title>` and page heading.
    pub title: String,
    /// Value of the `lang` attribute on `<html>`.
    pub lang: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Book Catalog".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// Grid and panel dimensions (CSS values).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub cover_width: String,
    pub cover_height: String,
    /// Margin around each book in the grid.
    pub gap: String,
    /// Maximum width of the hover panel.
    pub panel_max_width: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            cover_width: "200px".to_string(),
            cover_height: "300px".to_string(),
            gap: "10px".to_string(),
            panel_max_width: "400px".to_string(),
        }
    }
}

/// Hover panel colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub panel_background: String,
    pub panel_border: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            panel_background: "#f9f9f9".to_string(),
            panel_border: "#cccccc".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `bookwall.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.display().to_string(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `bookwall.toml` in the library root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `bookwall.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# bookwall configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as bookwall.toml next to your catalog export.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Catalog XML export (e.g. `calibredb catalog books.xml`),
# relative to the library root.
catalog = "books.xml"

# Image used for every record without a <cover>, relative to the library root.
default_cover = "book-default-cover.jpg"

# Folder inside the output directory that receives cover copies.
covers_dir = "covers"

# Name of the generated page inside the output directory.
index_file = "index.html"

# ---------------------------------------------------------------------------
# Page
# ---------------------------------------------------------------------------
[page]
title = "Book Catalog"
lang = "en"

# ---------------------------------------------------------------------------
# Theme / layout (CSS values)
# ---------------------------------------------------------------------------
[theme]
cover_width = "200px"
cover_height = "300px"

# Margin around each cover in the grid.
gap = "10px"

# Width cap of the metadata panel shown on hover.
panel_max_width = "400px"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
panel_background = "#f9f9f9"
panel_border = "#cccccc"
"##
}

/// Generate CSS custom properties from theme and color config.
pub fn generate_theme_css(theme: &ThemeConfig, colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --cover-width: {cover_width};
    --cover-height: {cover_height};
    --book-gap: {gap};
    --panel-max-width: {panel_max_width};
    --panel-bg: {panel_bg};
    --panel-border: {panel_border};
}}"#,
        cover_width = theme.cover_width,
        cover_height = theme.cover_height,
        gap = theme.gap,
        panel_max_width = theme.panel_max_width,
        panel_bg = colors.panel_background,
        panel_border = colors.panel_border,
    )
}
