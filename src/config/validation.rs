use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig, TransportConfig};
use crate::ConfigError;
use url::Url;

const MAX_CONCURRENCY: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_transport_config(&config.transport)?;
    validate_output_config(&config.output)?;
    for (name, site) in &config.sites {
        validate_site_config(name, site)?;
    }
    Ok(())
}

/// Validates concurrency limits and timeouts
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("metadata-concurrency", config.metadata_concurrency),
        ("chapter-concurrency", config.chapter_concurrency),
        ("file-concurrency", config.file_concurrency),
    ] {
        if value < 1 || value > MAX_CONCURRENCY {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_CONCURRENCY, value
            )));
        }
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }
    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.base_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "base-dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Site base URLs are joined against relative hrefs, so they must be
/// absolute http(s) URLs ending in '/'
fn validate_site_config(name: &str, config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base-url for site '{}': {}", name, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url for site '{}' must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    if !config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base-url for site '{}' must end with '/'",
            name
        )));
    }

    Ok(())
}
