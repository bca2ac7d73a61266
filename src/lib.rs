//! # Bookwall
//!
//! A static page generator for e-book catalogs. Point it at a library export
//! and it writes one HTML page that shows every book as a cover, with the
//! book's metadata and external links revealed on hover.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! A build runs three stages in order, each a plain function over the output
//! of the previous one:
//!
//! ```text
//! 1. Read       books.xml    →  Vec<BookRecord>   (catalog → raw records)
//! 2. Normalize  records      →  Vec<Book> + covers/   (authors, covers, links)
//! 3. Generate   books        →  index.html        (final page)
//! ```
//!
//! Nothing is cached between runs and nothing runs concurrently. The first
//! fatal error stops the build.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Stage 1: parses the catalog XML into [`types::BookRecord`]s |
//! | [`normalize`] | Stage 2: joins authors, copies covers, builds links |
//! | [`generate`] | Stage 3: renders the page with Maud |
//! | [`pipeline`] | Runs the stages end to end; `build` and `check` |
//! | [`naming`] | Safe cover filenames derived from a cover's parent folders |
//! | [`links`] | Identifier parsing and the Amazon search fallback |
//! | [`config`] | `bookwall.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Types passed between stages (`BookRecord`, `Book`, `Link`) |
//! | [`output`] | CLI output formatting for each command |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system, rather than a runtime template directory. Every interpolated
//! catalog value is escaped automatically, so a title such as `<script>` is
//! displayed as text. There are no template files to ship or get out of sync.
//!
//! ## No JavaScript
//!
//! The metadata panel is revealed with a pure CSS `:hover` rule. The page is a
//! single self-contained file plus its covers folder and works from `file://`.
//!
//! ## Cover Names From Folders
//!
//! Catalog tools store covers as `<Author>/<Title (id)>/cover.jpg`, so the leaf
//! filename carries no information. [`naming::cover_filename`] builds the
//! output name from the two parent folders instead. Two covers that share both
//! folders map to the same file and the later one wins.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod links;
pub mod naming;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
