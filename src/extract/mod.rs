//! Page extraction: turning fetched HTML into novel records
//!
//! Each site supplies a [`PageExtractor`] for its markup. This module also
//! holds the site-independent helpers extractors share:
//! - field normalisers (word counts, update dates, status, page indicators)
//! - edge-noise filtering of chapter text

mod cleanup;
mod fields;

pub use cleanup::{strip_edge_noise, HEAD_LINES, TAIL_LINES};
pub use fields::{
    derive_status, parse_total_pages, parse_update_date, parse_word_count,
    COMPLETED_AFTER_DAYS, UPDATE_DATE_FORMAT,
};

use crate::model::{ChapterRef, NovelMetadata, NovelReference};
use thiserror::Error;

/// Expected markup was missing or malformed
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing element: {what}")]
    MissingElement { what: String },

    #[error("Invalid {field} value: '{value}'")]
    InvalidField { field: &'static str, value: String },
}

impl ExtractError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingElement { what: what.into() }
    }
}

/// Site-specific markup parser
///
/// Implementations are synchronous and should stay cheap: they run between
/// network suspensions and block sibling tasks while they do.
pub trait PageExtractor: Send + Sync {
    /// Parses a novel detail page fetched from `url`
    fn extract_metadata(&self, html: &str, url: &str) -> Result<NovelMetadata, ExtractError>;

    /// Parses a catalog page into the outline, in reading order
    fn extract_chapter_list(&self, html: &str) -> Result<Vec<ChapterRef>, ExtractError>;

    /// Parses a chapter page into plain text
    fn extract_chapter_content(&self, html: &str) -> Result<String, ExtractError>;

    /// Parses a listing or search result page, in site order
    fn extract_search_results(&self, html: &str) -> Result<Vec<NovelReference>, ExtractError>;

    /// Reads the listing's total page count; zero when absent
    fn extract_total_pages(&self, html: &str) -> u32;
}
