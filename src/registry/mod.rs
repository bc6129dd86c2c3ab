//! Crawler registry
//!
//! Maps a site name to a factory that builds its crawler from configuration.
//! The registry is an ordinary value: the caller creates it, registers the
//! sites it wants, then resolves names against it.

use crate::config::Config;
use crate::crawler::{NovelCrawler, SiteCrawler};
use crate::sites::{ujxsw, UjxswSite};
use crate::NovelError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a crawler for one site from configuration
pub type CrawlerFactory =
    Arc<dyn Fn(&Config) -> Result<Arc<dyn NovelCrawler>, NovelError> + Send + Sync>;

/// Name to crawler-factory mapping
#[derive(Clone, Default)]
pub struct CrawlerRegistry {
    factories: BTreeMap<String, CrawlerFactory>,
}

impl CrawlerRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in site registered
    pub fn with_builtin_sites() -> Self {
        let mut registry = Self::new();
        registry.register(ujxsw::SITE_NAME, Arc::new(build_ujxsw));
        registry
    }

    /// Registers `factory` under `name`, replacing any earlier entry
    pub fn register(&mut self, name: impl Into<String>, factory: CrawlerFactory) {
        let name = name.into();
        if self.factories.insert(name.clone(), factory).is_some() {
            tracing::debug!("Replaced crawler registration for '{}'", name);
        }
    }

    /// Builds the crawler registered under `name`
    ///
    /// Returns [`NovelError::CrawlerNotFound`] when nothing is registered
    /// under that name.
    pub fn create(&self, name: &str, config: &Config) -> Result<Arc<dyn NovelCrawler>, NovelError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| NovelError::CrawlerNotFound {
                site: name.to_string(),
            })?;
        factory(config)
    }

    /// Registered names, sorted
    pub fn site_names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

fn build_ujxsw(config: &Config) -> Result<Arc<dyn NovelCrawler>, NovelError> {
    let base_url = config
        .site_base_url(ujxsw::SITE_NAME)
        .unwrap_or(ujxsw::DEFAULT_BASE_URL);
    let site = UjxswSite::new(base_url)?;
    Ok(Arc::new(SiteCrawler::from_config(site, config)?))
}
