use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.1000.0 Safari/537.36";

/// Main configuration structure for Novel-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    pub output: OutputConfig,
    /// Per-site overrides keyed by registry name
    #[serde(default)]
    pub sites: HashMap<String, SiteConfig>,
}

impl Config {
    /// Returns the configured base URL for a site, if overridden
    pub fn site_base_url(&self, site: &str) -> Option<&str> {
        self.sites.get(site).map(|s| s.base_url.as_str())
    }
}

/// Concurrency limits and timeouts for one crawler instance
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum simultaneous detail, listing and catalog page fetches
    #[serde(rename = "metadata-concurrency")]
    pub metadata_concurrency: usize,

    /// Maximum simultaneous chapter content fetches
    #[serde(rename = "chapter-concurrency")]
    pub chapter_concurrency: usize,

    /// Maximum simultaneous novel file writes
    #[serde(rename = "file-concurrency")]
    pub file_concurrency: usize,

    /// Upper bound on a single fetch, body included (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

/// HTTP transport settings shared by every fetch of a crawler
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory; novels land in `{base-dir}/{tag}/{title}_{author}.txt`
    #[serde(rename = "base-dir")]
    pub base_dir: String,

    /// What to do when the novel file already exists
    #[serde(rename = "on-existing", default)]
    pub on_existing: ExistingFilePolicy,
}

/// Handling of a novel file left over from an earlier run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExistingFilePolicy {
    /// Append chapters after the existing content
    #[default]
    Append,
    /// Truncate the file before writing
    Overwrite,
}

/// Per-site override entry
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root, e.g. "http://www.ujxsw.org/"
    #[serde(rename = "base-url")]
    pub base_url: String,
}
