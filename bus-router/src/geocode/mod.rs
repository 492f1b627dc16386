//! Free-text destination lookup.
//!
//! The resolver works on coordinates; a `Geocoder` turns what the rider
//! typed into candidate coordinates. Only the first candidate is used.

mod client;
mod error;

use std::collections::HashMap;
use std::future::Future;

use tracing::debug;

use crate::domain::LatLon;

pub use client::{BoundingBox, GeocoderConfig, NominatimClient};
pub use error::GeocodeError;

/// Source of coordinates for free-text queries.
pub trait Geocoder: Send + Sync + 'static {
    /// Candidate locations for `query`, best first. May be empty.
    fn geocode(&self, query: &str)
    -> impl Future<Output = Result<Vec<LatLon>, GeocodeError>> + Send;
}

/// Resolve `query` to its best candidate.
///
/// # Errors
///
/// `EmptyQuery` for blank input, `NotFound` if the geocoder has no
/// candidates, or whatever the geocoder itself failed with.
pub async fn first_match<G: Geocoder>(geocoder: &G, query: &str) -> Result<LatLon, GeocodeError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(GeocodeError::EmptyQuery);
    }

    let candidates = geocoder.geocode(query).await?;
    debug!(query, candidates = candidates.len(), "Geocoded destination");

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NotFound {
            query: query.to_string(),
        })
}

/// Geocoder answering from a fixed table, for development and tests.
///
/// Queries match case-insensitively after trimming.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Vec<LatLon>>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `candidates`.
    pub fn with_place(mut self, query: &str, candidates: Vec<LatLon>) -> Self {
        self.places.insert(normalize(query), candidates);
        self
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<LatLon>, GeocodeError> {
        Ok(self
            .places
            .get(&normalize(query))
            .cloned()
            .unwrap_or_default())
    }
}
