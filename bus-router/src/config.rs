//! Server configuration from environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{DEFAULT_SHARD_PREFIX_LEN, numeric_catalogue};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_FEED_BASE_URL: &str = "http://localhost:8000/gtfs_latest/json";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_STOPS_PATH: &str = "data/stops.json";
const DEFAULT_SHAPES_PATH: &str = "data/shapes.json";
const DEFAULT_MAX_TRANSFERS: usize = 2;

/// Longest prefix for which `numeric` enumerates every shard.
const MAX_NUMERIC_PREFIX_LEN: usize = 4;

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Where stop lookups find their trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShardCatalogue {
    /// Use the stop index published with the dataset.
    Published,
    /// Scan every zero-padded numeric prefix.
    Numeric,
    /// Scan exactly these prefixes.
    Prefixes(Vec<String>),
}

impl ShardCatalogue {
    /// Prefixes to scan, or `None` for the published index.
    pub fn prefixes(&self, prefix_len: usize) -> Option<Vec<String>> {
        match self {
            ShardCatalogue::Published => None,
            ShardCatalogue::Numeric => Some(numeric_catalogue(prefix_len)),
            ShardCatalogue::Prefixes(prefixes) => Some(prefixes.clone()),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub feed_base_url: String,
    pub stops_path: PathBuf,
    pub shapes_path: PathBuf,
    pub shard_prefix_len: usize,
    pub shard_catalogue: ShardCatalogue,
    /// Serve trip chunks from this directory instead of over HTTP.
    pub mock_data_dir: Option<PathBuf>,
    pub geocoder_url: String,
    pub max_transfers: usize,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let listen_addr = parse_or(&get, "BUS_LISTEN_ADDR", DEFAULT_LISTEN_ADDR)?;
        let shard_prefix_len = parse_or(
            &get,
            "BUS_SHARD_PREFIX_LEN",
            &DEFAULT_SHARD_PREFIX_LEN.to_string(),
        )?;
        if shard_prefix_len == 0 {
            return Err(ConfigError::Invalid {
                var: "BUS_SHARD_PREFIX_LEN",
                message: "must be at least 1".to_string(),
            });
        }

        let shard_catalogue = match get("BUS_SHARD_CATALOGUE") {
            None => ShardCatalogue::Published,
            Some(v) if v.trim().eq_ignore_ascii_case("numeric") => {
                if shard_prefix_len > MAX_NUMERIC_PREFIX_LEN {
                    return Err(ConfigError::Invalid {
                        var: "BUS_SHARD_CATALOGUE",
                        message: format!(
                            "numeric catalogue needs a prefix length of at most {MAX_NUMERIC_PREFIX_LEN}"
                        ),
                    });
                }
                ShardCatalogue::Numeric
            }
            Some(v) => ShardCatalogue::Prefixes(
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        };

        Ok(Self {
            listen_addr,
            feed_base_url: get("BUS_FEED_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FEED_BASE_URL.to_string()),
            stops_path: get("BUS_STOPS_PATH")
                .unwrap_or_else(|| DEFAULT_STOPS_PATH.to_string())
                .into(),
            shapes_path: get("BUS_SHAPES_PATH")
                .unwrap_or_else(|| DEFAULT_SHAPES_PATH.to_string())
                .into(),
            shard_prefix_len,
            shard_catalogue,
            mock_data_dir: get("BUS_MOCK_DATA_DIR").map(PathBuf::from),
            geocoder_url: get("BUS_GEOCODER_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_string()),
            max_transfers: parse_or(
                &get,
                "BUS_MAX_TRANSFERS",
                &DEFAULT_MAX_TRANSFERS.to_string(),
            )?,
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = get(var).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        message: format!("{raw:?}: {e}"),
    })
}
