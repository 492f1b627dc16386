//! Map overlay for a found itinerary.
//!
//! Turns each leg into a colored polyline using the shape of the trip it
//! rides, and picks out the transfer stops and the final stop for markers.

use serde::Serialize;
use tracing::debug;

use crate::cache::TripCache;
use crate::datasets::{ShapeCatalog, StopCatalog};
use crate::domain::{Itinerary, LatLon, Stop, TripId};
use crate::feed::TripSource;

/// Colors assigned to legs in order, wrapping around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Vec<String>);

impl Palette {
    /// Create a palette. Returns `None` if `colors` is empty.
    pub fn new(colors: Vec<String>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self(colors))
        }
    }

    /// Color for the leg at `leg_index`.
    pub fn color_for(&self, leg_index: usize) -> &str {
        &self.0[leg_index % self.0.len()]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self(
            ["#007AFF", "#FF3B30", "#34C759", "#FF9500", "#AF52DE"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

/// One leg drawn as a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineSegment {
    /// Position of the leg in the itinerary.
    pub leg_index: usize,
    pub trip_id: TripId,
    pub coords: Vec<LatLon>,
    pub color: String,
}

/// Everything needed to draw an itinerary on a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOverlay {
    /// In leg order. Legs without a known shape have no segment.
    pub segments: Vec<PolylineSegment>,

    /// Where the rider changes bus, in order.
    pub transfer_stops: Vec<Stop>,

    pub final_stop: Option<Stop>,
}

/// Build the overlay for `itinerary`.
///
/// A leg gets a segment only if its trip can be fetched and carries a shape
/// id present in `shapes`. The whole shape is drawn, not just the ridden
/// part. Colors follow leg position, so a leg with no segment still uses
/// up its color.
pub async fn assemble<S: TripSource>(
    itinerary: &Itinerary,
    cache: &TripCache<S>,
    shapes: &ShapeCatalog,
    stops: &StopCatalog,
    palette: &Palette,
) -> RouteOverlay {
    let mut segments = Vec::new();

    for (leg_index, leg) in itinerary.legs().iter().enumerate() {
        let Some(trip) = cache.get_trip(&leg.trip_id).await else {
            debug!(trip = %leg.trip_id, "Trip unavailable, leg drawn without shape");
            continue;
        };
        let Some(coords) = trip.shape_id.as_deref().and_then(|id| shapes.get(id)) else {
            debug!(trip = %leg.trip_id, shape = ?trip.shape_id, "No shape for trip");
            continue;
        };

        segments.push(PolylineSegment {
            leg_index,
            trip_id: leg.trip_id.clone(),
            coords: coords.to_vec(),
            color: palette.color_for(leg_index).to_string(),
        });
    }

    let transfer_stops = itinerary
        .transfer_stops()
        .filter_map(|id| stops.get(id).cloned())
        .collect();

    RouteOverlay {
        segments,
        transfer_stops,
        final_stop: Some(itinerary.final_stop().clone()),
    }
}
