//! Mock trip source for development and tests.
//!
//! Serves chunks from memory or from a directory of `{prefix}.json` files
//! in the same format as the remote endpoint. Counts fetches and can be
//! told to fail specific shards or to respond slowly.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::TripSource;
use super::convert::{StopTripIndex, TripChunk, convert_chunk, convert_stop_index};
use super::error::FetchError;
use super::types::{RawChunk, RawStopIndex};

/// File name of the published stop index inside a mock data directory.
const STOP_INDEX_FILE: &str = "stop_lookup.json";

/// Trip source backed by pre-loaded chunks.
#[derive(Debug, Default)]
pub struct MockTripSource {
    chunks: HashMap<String, TripChunk>,
    stop_index: Option<StopTripIndex>,
    failing: HashSet<String>,
    latency: Option<Duration>,
    fetches: AtomicUsize,
    fetches_by_prefix: Mutex<HashMap<String, usize>>,
}

impl MockTripSource {
    /// Create an empty source: every chunk is "not found".
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `{prefix}.json` chunk in `data_dir`, plus `stop_lookup.json`
    /// if present.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let data_dir = data_dir.as_ref();
        let mut source = Self::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| FetchError::Io {
            message: format!("Failed to read mock data directory {:?}: {}", data_dir, e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| FetchError::Io {
                message: format!("Failed to read directory entry: {}", e),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let json = std::fs::read_to_string(&path).map_err(|e| FetchError::Io {
                message: format!("Failed to read {:?}: {}", path, e),
            })?;

            if path.file_name().and_then(|s| s.to_str()) == Some(STOP_INDEX_FILE) {
                let raw: RawStopIndex = parse(&json, &path)?;
                source.stop_index = Some(convert_stop_index(raw));
                continue;
            }

            let prefix = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| FetchError::Io {
                    message: format!("Invalid filename: {:?}", path),
                })?;

            let raw: RawChunk = parse(&json, &path)?;
            source.chunks.insert(prefix.to_string(), convert_chunk(raw));
        }

        if source.chunks.is_empty() {
            return Err(FetchError::Io {
                message: format!("No chunk files found in {:?}", data_dir),
            });
        }

        Ok(source)
    }

    /// Add a chunk under `prefix`.
    pub fn with_chunk(mut self, prefix: &str, chunk: TripChunk) -> Self {
        self.chunks.insert(prefix.to_string(), chunk);
        self
    }

    /// Make fetches of `prefix` fail with a server error.
    pub fn with_failure(mut self, prefix: &str) -> Self {
        self.failing.insert(prefix.to_string());
        self
    }

    /// Delay every response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Prefixes this source can serve, sorted.
    pub fn prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.chunks.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    /// Total chunk fetches served (including failures).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Chunk fetches served for one prefix.
    pub fn fetch_count_for(&self, prefix: &str) -> usize {
        self.fetches_by_prefix
            .lock()
            .map(|m| m.get(prefix).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn record_fetch(&self, prefix: &str) {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut by_prefix) = self.fetches_by_prefix.lock() {
            *by_prefix.entry(prefix.to_string()).or_insert(0) += 1;
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(json: &str, path: &Path) -> Result<T, FetchError> {
    serde_json::from_str(json).map_err(|e| FetchError::Json {
        message: format!("Failed to parse {:?}: {}", path, e),
        body: None,
    })
}

impl TripSource for MockTripSource {
    async fn fetch_chunk(&self, prefix: &str) -> Result<TripChunk, FetchError> {
        self.record_fetch(prefix);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.contains(prefix) {
            return Err(FetchError::Api {
                status: 503,
                message: format!("injected failure for {prefix}"),
            });
        }

        self.chunks
            .get(prefix)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                resource: format!("trip_lookup/{prefix}.json"),
            })
    }

    async fn fetch_stop_index(&self) -> Result<StopTripIndex, FetchError> {
        self.stop_index.clone().ok_or_else(|| FetchError::NotFound {
            resource: STOP_INDEX_FILE.to_string(),
        })
    }
}
