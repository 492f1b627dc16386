//! Trip and stop-time types.

use serde::Serialize;

use super::{ServiceTime, StopId, TripId};

/// One entry in a trip's ordered stop sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopTime {
    pub stop_id: StopId,
    pub arrival_time: Option<ServiceTime>,
    pub departure_time: Option<ServiceTime>,
}

impl StopTime {
    pub fn new(
        stop_id: StopId,
        arrival_time: Option<ServiceTime>,
        departure_time: Option<ServiceTime>,
    ) -> Self {
        Self {
            stop_id,
            arrival_time,
            departure_time,
        }
    }
}

/// A scheduled trip: one vehicle run along an ordered sequence of stops.
///
/// Immutable once fetched; shared as `Arc<Trip>` between the cache and
/// any itineraries built from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub id: TripId,
    pub shape_id: Option<String>,
    pub route_id: Option<String>,
    pub headsign: Option<String>,
    pub stops: Vec<StopTime>,
}

impl Trip {
    /// Position of the first visit to `stop` in the stop sequence.
    pub fn position_of(&self, stop: &StopId) -> Option<usize> {
        self.stops.iter().position(|st| &st.stop_id == stop)
    }

    /// Whether this trip visits `stop` at all.
    pub fn visits(&self, stop: &StopId) -> bool {
        self.position_of(stop).is_some()
    }

    /// Stop times after position `idx`, paired with their positions.
    pub fn stops_after(&self, idx: usize) -> impl Iterator<Item = (usize, &StopTime)> {
        self.stops.iter().enumerate().skip(idx + 1)
    }
}
