//! Generic crawler driving any [`Site`] over one fetcher and gate set

use crate::concurrency::{gather_or_default, GatePools};
use crate::config::Config;
use crate::crawler::writer::NovelWriter;
use crate::crawler::NovelCrawler;
use crate::fetch::{FetchRequest, Fetcher};
use crate::model::{Chapter, ChapterRef, NovelMetadata, NovelReference};
use crate::sites::Site;
use crate::NovelError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Crawler for a single site
///
/// Every page fetch holds one slot of the gate for its class for exactly
/// the duration of that fetch: listing, detail and catalog pages use the
/// metadata gate, chapter pages the chapter gate, and writes the file gate.
/// Gates are never held across a nested batch, so no operation waits on a
/// slot its own caller is holding.
pub struct SiteCrawler<S: Site> {
    site: S,
    fetcher: Fetcher,
    gates: GatePools,
    writer: NovelWriter,
}

impl<S: Site> SiteCrawler<S> {
    pub fn new(site: S, fetcher: Fetcher, gates: GatePools, writer: NovelWriter) -> Self {
        Self {
            site,
            fetcher,
            gates,
            writer,
        }
    }

    /// Builds the fetcher, gates and writer from configuration
    ///
    /// The site root is sent as `Referer` with every request.
    pub fn from_config(site: S, config: &Config) -> Result<Self, NovelError> {
        let fetcher = Fetcher::from_config(
            &config.transport,
            Some(site.base_url()),
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        let gates = GatePools::from_config(&config.crawler);
        let writer = NovelWriter::new(
            &config.output.base_dir,
            gates.file.clone(),
            config.output.on_existing,
        );

        tracing::debug!(
            "Crawler for {} ready (metadata={}, chapter={}, file={})",
            site.name(),
            gates.metadata.limit(),
            gates.chapter.limit(),
            gates.file.limit()
        );

        Ok(Self::new(site, fetcher, gates, writer))
    }

    pub fn site(&self) -> &S {
        &self.site
    }

    pub fn gates(&self) -> &GatePools {
        &self.gates
    }

    /// Fetches a page through the metadata gate
    async fn metadata_page(&self, request: &FetchRequest) -> Result<String, NovelError> {
        Ok(self
            .gates
            .metadata
            .run(self.fetcher.fetch(request))
            .await?)
    }

    /// Fetches and parses one listing page
    async fn listing(&self, request: FetchRequest) -> Result<Vec<NovelReference>, NovelError> {
        let html = self.metadata_page(&request).await?;
        Ok(self.site.extract_search_results(&html)?)
    }
}

#[async_trait]
impl<S: Site> NovelCrawler for SiteCrawler<S> {
    fn site_name(&self) -> &str {
        self.site.name()
    }

    async fn novels_by_tag(
        &self,
        tag: &str,
        top_n: Option<usize>,
    ) -> Result<Vec<NovelReference>, NovelError> {
        if !self.site.supports_tag(tag) {
            tracing::warn!("{} has no listing for tag '{}'", self.site.name(), tag);
            return Ok(Vec::new());
        }

        let index = self
            .metadata_page(&FetchRequest::get(self.site.tag_index_url(tag)))
            .await?;
        let total = self.site.extract_total_pages(&index);

        let mut novels = if total == 0 {
            // No page indicator: the index is the whole listing
            match self.site.extract_search_results(&index) {
                Ok(novels) => novels,
                Err(e) => {
                    tracing::debug!("Tag '{}' index has no listing: {}", tag, e);
                    Vec::new()
                }
            }
        } else {
            tracing::info!("Tag '{}' spans {} listing pages", tag, total);
            let pages = (1..=total)
                .map(|page| self.listing(FetchRequest::get(self.site.tag_page_url(tag, page))));
            gather_or_default("listing page", pages)
                .await
                .into_iter()
                .flatten()
                .collect()
        };

        if let Some(n) = top_n {
            novels.truncate(n);
        }

        tracing::info!("Found {} novels under tag '{}'", novels.len(), tag);
        Ok(novels)
    }

    async fn novels_by_author(&self, author: &str) -> Result<Vec<NovelReference>, NovelError> {
        let mut novels = self
            .listing(FetchRequest::get(self.site.author_listing_url(author)))
            .await?;

        for novel in novels.iter_mut().filter(|n| n.author.is_empty()) {
            novel.author = author.to_string();
        }

        tracing::info!("Found {} novels by '{}'", novels.len(), author);
        Ok(novels)
    }

    async fn novels_by_keyword(
        &self,
        keyword: &str,
        top_n: usize,
    ) -> Result<Vec<NovelReference>, NovelError> {
        let mut novels = self.listing(self.site.keyword_search(keyword)).await?;
        novels.truncate(top_n);

        tracing::info!("Found {} novels matching '{}'", novels.len(), keyword);
        Ok(novels)
    }

    async fn novel_metadata(&self, detail_url: &str) -> Result<NovelMetadata, NovelError> {
        let html = self
            .metadata_page(&FetchRequest::get(detail_url))
            .await?;
        let metadata = self.site.extract_metadata(&html, detail_url)?;

        if metadata.is_empty() {
            return Err(NovelError::EmptyMetadata {
                url: detail_url.to_string(),
            });
        }
        Ok(metadata)
    }

    async fn chapter_list(&self, catalog_url: &str) -> Result<Vec<ChapterRef>, NovelError> {
        let html = self
            .metadata_page(&FetchRequest::get(catalog_url))
            .await?;
        Ok(self.site.extract_chapter_list(&html)?)
    }

    async fn chapter_content(&self, chapter_url: &str) -> Result<String, NovelError> {
        let html = self
            .gates
            .chapter
            .run(self.fetcher.fetch(&FetchRequest::get(chapter_url)))
            .await?;
        Ok(self.site.extract_chapter_content(&html)?)
    }

    fn novel_path(&self, metadata: &NovelMetadata) -> PathBuf {
        self.writer.novel_path(metadata)
    }

    async fn persist(
        &self,
        metadata: &NovelMetadata,
        chapters: &[Chapter],
    ) -> Result<PathBuf, NovelError> {
        self.writer.write(metadata, chapters).await
    }
}
