//! Nominatim geocoding client.

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::domain::LatLon;

use super::Geocoder;
use super::error::GeocodeError;

/// Default Nominatim endpoint.
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying User-Agent.
const USER_AGENT: &str = concat!("bus-router/", env!("CARGO_PKG_VERSION"));

/// A latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

impl BoundingBox {
    /// The Oahu service area.
    pub const OAHU: BoundingBox = BoundingBox {
        south_west: LatLon {
            lat: 20.79775,
            lon: -158.25751,
        },
        north_east: LatLon {
            lat: 22.09184,
            lon: -157.63531,
        },
    };

    pub fn contains(&self, point: &LatLon) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lon..=self.north_east.lon).contains(&point.lon)
    }

    /// Nominatim `viewbox` parameter: `lon1,lat1,lon2,lat2`.
    fn viewbox_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.south_west.lon, self.south_west.lat, self.north_east.lon, self.north_east.lat
        )
    }
}

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL; `/search` is appended
    pub base_url: String,
    /// Restrict results to this area
    pub viewbox: Option<BoundingBox>,
    /// Maximum number of candidates requested
    pub limit: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeocoderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            viewbox: Some(BoundingBox::OAHU),
            limit: 5,
            timeout_secs: 10,
        }
    }

    /// Restrict results to `viewbox`, or search everywhere with `None`.
    pub fn with_viewbox(mut self, viewbox: Option<BoundingBox>) -> Self {
        self.viewbox = viewbox;
        self
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// One Nominatim search result. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Client for a Nominatim-compatible search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimClient {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// The search URL for `query`.
    pub fn search_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let base = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let mut params = vec![
            ("format", "json".to_string()),
            ("q", query.to_string()),
            ("limit", self.config.limit.to_string()),
        ];
        if let Some(viewbox) = &self.config.viewbox {
            params.push(("viewbox", viewbox.viewbox_param()));
            params.push(("bounded", "1".to_string()));
        }

        Url::parse_with_params(&base, &params).map_err(|e| GeocodeError::InvalidUrl {
            message: e.to_string(),
        })
    }
}

/// Parse a Nominatim response body, dropping candidates with bad coordinates.
fn parse_places(body: &str) -> Result<Vec<LatLon>, GeocodeError> {
    let places: Vec<Place> = serde_json::from_str(body).map_err(|e| GeocodeError::Json {
        message: e.to_string(),
    })?;

    Ok(places
        .into_iter()
        .filter_map(|place| {
            let point = LatLon::new(place.lat.parse().ok()?, place.lon.parse().ok()?);
            point.is_valid().then_some(point)
        })
        .collect())
}

impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Vec<LatLon>, GeocodeError> {
        let url = self.search_url(query)?;
        debug!(query, "Geocoding");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_places(&body)
    }
}
