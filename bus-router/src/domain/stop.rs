//! Bus stop type.

use serde::{Deserialize, Serialize};

use super::{LatLon, StopId};

/// A stop from the static stop dataset. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub lat: f64,
    pub lon: f64,
}

impl Stop {
    pub fn new(id: StopId, lat: f64, lon: f64) -> Self {
        Self { id, lat, lon }
    }

    /// The stop's position.
    pub fn coord(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// Distance in meters from this stop to `point`.
    pub fn distance_to(&self, point: &LatLon) -> f64 {
        self.coord().distance_to(point)
    }
}
