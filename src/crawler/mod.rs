//! Crawler module: discovery, enrichment, chapter fetching and persistence
//!
//! This module contains the orchestration layer, including:
//! - The `NovelCrawler` capability trait every site crawler satisfies
//! - `SiteCrawler`, which drives any `Site` through a shared fetcher and gates
//! - The per-novel assembly pipeline (outline, contents, persist)
//! - Batch harvesting of many novels with per-novel failure isolation

mod harvest;
mod pipeline;
mod report;
mod site_crawler;
mod writer;

pub use harvest::{harvest, HarvestOptions, SortKey};
pub use pipeline::{assemble_novel, fetch_chapters, write_novel};
pub use report::{print_report, HarvestReport, NovelOutcome, NovelReport, Stage};
pub use site_crawler::SiteCrawler;
pub use writer::{format_chapter, sanitize_component, NovelWriter};

use crate::model::{Chapter, ChapterRef, NovelMetadata, NovelReference};
use crate::NovelError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Capability set of a site crawler
///
/// Every operation acts on a single page or a single novel and reports
/// failure through its `Result`. Batch callers ([`harvest`],
/// [`fetch_chapters`]) turn per-item errors into empty values so one bad
/// page never aborts its siblings.
#[async_trait]
pub trait NovelCrawler: Send + Sync {
    /// Registry name of the site this crawler targets
    fn site_name(&self) -> &str;

    /// Every novel listed under `tag`, across all listing pages, optionally
    /// cut to the first `top_n` in listing order
    async fn novels_by_tag(
        &self,
        tag: &str,
        top_n: Option<usize>,
    ) -> Result<Vec<NovelReference>, NovelError>;

    /// Every novel listed for `author`
    async fn novels_by_author(&self, author: &str) -> Result<Vec<NovelReference>, NovelError>;

    /// The `top_n` best keyword matches, in the site's ranking order
    async fn novels_by_keyword(
        &self,
        keyword: &str,
        top_n: usize,
    ) -> Result<Vec<NovelReference>, NovelError>;

    /// Enriches a detail page into full metadata
    async fn novel_metadata(&self, detail_url: &str) -> Result<NovelMetadata, NovelError>;

    /// The outline found at `catalog_url`, in reading order
    async fn chapter_list(&self, catalog_url: &str) -> Result<Vec<ChapterRef>, NovelError>;

    /// Plain text of one chapter
    async fn chapter_content(&self, chapter_url: &str) -> Result<String, NovelError>;

    /// File a novel's chapters are persisted to
    fn novel_path(&self, metadata: &NovelMetadata) -> PathBuf;

    /// Writes the chapters, in the given order, to the novel's file
    async fn persist(
        &self,
        metadata: &NovelMetadata,
        chapters: &[Chapter],
    ) -> Result<PathBuf, NovelError>;
}
