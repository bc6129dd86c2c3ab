//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for a crawler, including:
//! - Building the shared HTTP client (user agent, referer, cookie jar)
//! - GET and form-POST requests
//! - Per-fetch timeout covering the request and the body read
//! - Error classification

use crate::config::TransportConfig;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Failed to read response body from {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// HTTP method and payload of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMethod {
    Get,
    /// `application/x-www-form-urlencoded` POST
    PostForm(Vec<(String, String)>),
}

/// A single request to issue through a [`Fetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub method: FetchMethod,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: FetchMethod::Get,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            method: FetchMethod::PostForm(form),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - Transport settings (user agent, connect timeout)
/// * `referer` - Default `Referer` header sent with every request, if any
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &TransportConfig,
    referer: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Some(value) = referer.and_then(|r| HeaderValue::from_str(r).ok()) {
        headers.insert(REFERER, value);
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues requests over one shared client
///
/// Cloning is cheap and clones share the connection pool and cookie jar,
/// so many fetches may be in flight at once.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Builds the client from configuration
    pub fn from_config(
        config: &TransportConfig,
        referer: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, referer)?, timeout))
    }

    /// Fetches a page and returns its decoded body
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | `Ok(body)` |
    /// | Other status | `Status` |
    /// | Connect / send failure | `Network` |
    /// | Body decode failure | `Body` |
    /// | Deadline passed | `Timeout` |
    pub async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        tracing::debug!("Fetching {} ({})", request.url, method_name(&request.method));

        match tokio::time::timeout(self.timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: request.url.clone(),
                after: self.timeout,
            }),
        }
    }

    async fn send(&self, request: &FetchRequest) -> Result<String, FetchError> {
        let builder = match &request.method {
            FetchMethod::Get => self.client.get(&request.url),
            FetchMethod::PostForm(form) => self.client.post(&request.url).form(form),
        };

        let response = builder.send().await.map_err(|e| FetchError::Network {
            url: request.url.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Body {
            url: request.url.clone(),
            source: e,
        })
    }
}

fn method_name(method: &FetchMethod) -> &'static str {
    match method {
        FetchMethod::Get => "GET",
        FetchMethod::PostForm(_) => "POST",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(timeout: Duration) -> Fetcher {
        Fetcher::from_config(&TransportConfig::default(), Some("http://localhost/"), timeout)
            .unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&TransportConfig::default(), None);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_get_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/book/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let body = fetcher(Duration::from_secs(5))
            .fetch(&FetchRequest::get(format!("{}/book/1/", server.uri())))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_post_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_string_contains("searchkey=dragon"))
            .respond_with(ResponseTemplate::new(200).set_body_string("found"))
            .mount(&server)
            .await;

        let request = FetchRequest::post_form(
            format!("{}/search", server.uri()),
            vec![("searchkey".to_string(), "dragon".to_string())],
        );
        let body = fetcher(Duration::from_secs(5)).fetch(&request).await.unwrap();
        assert_eq!(body, "found");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = fetcher(Duration::from_secs(5))
            .fetch(&FetchRequest::get(format!("{}/down", server.uri())))
            .await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = fetcher(Duration::from_millis(100))
            .fetch(&FetchRequest::get(format!("{}/slow", server.uri())))
            .await;
        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }
}
