//! Novel-Ripple: a bounded-concurrency web novel harvester
//!
//! This crate discovers novels on a fiction site (by tag, author or keyword),
//! enriches each listing into full metadata, fetches every chapter concurrently
//! under per-class admission limits, and writes each novel to a text file in
//! reading order. A failure on one page degrades that item only; sibling
//! chapters and sibling novels keep going.

pub mod concurrency;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod model;
pub mod registry;
pub mod sites;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Novel-Ripple operations
#[derive(Debug, Error)]
pub enum NovelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] fetch::FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] extract::ExtractError),

    #[error("No crawler registered for site '{site}'")]
    CrawlerNotFound { site: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    InvalidUrl(#[from] ::url::ParseError),

    #[error("Metadata for {url} came back empty")]
    EmptyMetadata { url: String },
}

impl NovelError {
    /// Wraps an IO error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Novel-Ripple operations
pub type Result<T> = std::result::Result<T, NovelError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use concurrency::{gather_or_default, gather_ordered, AdmissionGate, GatePools};
pub use config::Config;
pub use crawler::{harvest, HarvestOptions, HarvestReport, NovelCrawler, SiteCrawler, SortKey};
pub use model::{Chapter, ChapterRef, NovelMetadata, NovelReference, NovelStatus};
pub use registry::CrawlerRegistry;
