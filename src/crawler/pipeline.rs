//! Per-novel assembly: outline, chapter contents, persist
//!
//! Stages run strictly in order for one novel. Chapter contents are fetched
//! concurrently but always written in outline order.

use crate::concurrency::gather_or_default;
use crate::crawler::report::{NovelOutcome, Stage};
use crate::crawler::NovelCrawler;
use crate::model::{Chapter, ChapterRef, NovelMetadata};

/// Fetches every chapter of an outline concurrently
///
/// The result has one entry per outline entry, in outline order. A chapter
/// whose fetch fails keeps its title and gets empty content.
pub async fn fetch_chapters(crawler: &dyn NovelCrawler, outline: &[ChapterRef]) -> Vec<Chapter> {
    let contents = gather_or_default(
        "chapter",
        outline
            .iter()
            .map(|chapter| crawler.chapter_content(&chapter.content_url)),
    )
    .await;

    Chapter::pair(outline, contents)
}

/// Runs outline, contents and persist for already-enriched metadata
pub async fn assemble_novel(crawler: &dyn NovelCrawler, metadata: &NovelMetadata) -> NovelOutcome {
    let outline = match crawler.chapter_list(&metadata.catalog_url).await {
        Ok(outline) => outline,
        Err(e) => {
            tracing::warn!("Outline of '{}' unavailable: {}", metadata.title, e);
            return NovelOutcome::failed(Stage::Outline, e);
        }
    };

    tracing::info!(
        "Fetching {} chapters of '{}'",
        outline.len(),
        metadata.title
    );
    let chapters = fetch_chapters(crawler, &outline).await;
    let empty_chapters = chapters.iter().filter(|c| c.content.is_empty()).count();
    if empty_chapters > 0 {
        tracing::warn!(
            "'{}': {} of {} chapters came back empty",
            metadata.title,
            empty_chapters,
            chapters.len()
        );
    }

    match crawler.persist(metadata, &chapters).await {
        Ok(path) => NovelOutcome::Written {
            path,
            chapters: chapters.len(),
            empty_chapters,
        },
        Err(e) => {
            tracing::error!("Failed to write '{}': {}", metadata.title, e);
            NovelOutcome::failed(Stage::Persist, e)
        }
    }
}

/// Enriches one detail page and assembles the novel it describes
pub async fn write_novel(crawler: &dyn NovelCrawler, detail_url: &str) -> NovelOutcome {
    match crawler.novel_metadata(detail_url).await {
        Ok(metadata) => assemble_novel(crawler, &metadata).await,
        Err(e) => {
            tracing::warn!("Metadata for {} unavailable: {}", detail_url, e);
            NovelOutcome::failed(Stage::Enrich, e)
        }
    }
}
