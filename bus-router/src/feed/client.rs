//! HTTP client for the chunked trip dataset.
//!
//! Chunks live at `<base>/trip_lookup/<prefix>.json`; the optional
//! precomputed stop index lives at `<base>/stop_lookup.json`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use super::TripSource;
use super::convert::{StopTripIndex, TripChunk, convert_chunk, convert_stop_index};
use super::error::FetchError;
use super::types::{RawChunk, RawStopIndex};

/// Default base URL for the trip dataset.
const DEFAULT_BASE_URL: &str = "http://localhost:8000/gtfs_latest/json";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL the chunk paths are appended to
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for the remote trip dataset.
///
/// Uses a semaphore to bound concurrent requests; the catalogue scan and
/// resolver prefetch can otherwise issue many fetches at once.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// URL of the chunk holding trips whose id starts with `prefix`.
    pub fn chunk_url(&self, prefix: &str) -> String {
        format!("{}/trip_lookup/{}.json", self.base_url, prefix)
    }

    /// URL of the published stop index.
    pub fn stop_index_url(&self) -> String {
        format!("{}/stop_lookup.json", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        debug!(url, "Fetching");
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                resource: url.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl TripSource for FeedClient {
    async fn fetch_chunk(&self, prefix: &str) -> Result<TripChunk, FetchError> {
        let raw: RawChunk = self.get_json(&self.chunk_url(prefix)).await?;
        Ok(convert_chunk(raw))
    }

    async fn fetch_stop_index(&self) -> Result<StopTripIndex, FetchError> {
        let raw: RawStopIndex = self.get_json(&self.stop_index_url()).await?;
        Ok(convert_stop_index(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_builders() {
        let config = FeedConfig::new("http://example.test")
            .with_max_concurrent(2)
            .with_timeout(5);
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn urls_follow_dataset_layout() {
        let client = FeedClient::new(FeedConfig::new("https://bucket.test/gtfs_latest/json/")).unwrap();
        assert_eq!(
            client.chunk_url("402"),
            "https://bucket.test/gtfs_latest/json/trip_lookup/402.json"
        );
        assert_eq!(
            client.stop_index_url(),
            "https://bucket.test/gtfs_latest/json/stop_lookup.json"
        );
    }
}
