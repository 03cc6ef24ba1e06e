//! HTTP transport for the pipeline.
//!
//! One blocking-style fetch at a time, each followed unconditionally by the
//! configured pacing delay (the "offset") to throttle request rate against
//! the source site. The delay is not a retry or backoff mechanism.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use tracing::debug;

/// Fetch capability the engine depends on; the seam tests stub out.
#[async_trait]
pub trait Fetch {
    /// Fetch a URL and return the raw document text.
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Pacing delay applied after every fetch, in milliseconds.
    pub offset_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "otodom-harvest/0.2 (personal research)".to_string(),
            timeout_seconds: 30,
            offset_ms: 0,
        }
    }
}

/// Reqwest-backed fetcher with a fixed post-request pacing delay.
pub struct HttpClient {
    client: Client,
    offset: Duration,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            offset: Duration::from_millis(config.offset_ms),
        })
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "HTTP request failed with status {}: {}",
                response.status(),
                url
            );
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from: {url}"))?;

        debug!("Successfully fetched: {} ({} chars)", url, text.len());

        // Uniform pacing after every fetch, search and listing pages alike.
        if !self.offset.is_zero() {
            tokio::time::sleep(self.offset).await;
        }

        Ok(text)
    }
}
