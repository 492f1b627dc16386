//! Bus leg type.
//!
//! A `Leg` is one continuous ride on a single trip, from boarding stop to
//! alighting stop. Legs are created by the resolver while it searches.

use chrono::Duration;
use serde::Serialize;

use super::{DomainError, ServiceTime, StopId, Trip, TripId};

/// A leg of an itinerary (one bus).
///
/// # Invariants
///
/// - The alighting stop comes after the boarding stop in the trip's sequence
/// - Both stops belong to the trip the leg was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leg {
    pub trip_id: TripId,
    pub from_stop: StopId,
    pub to_stop: StopId,
    /// Departure from `from_stop`, when the feed publishes one.
    pub departure_time: Option<ServiceTime>,
    /// Arrival at `to_stop`, when the feed publishes one.
    pub arrival_time: Option<ServiceTime>,
}

impl Leg {
    /// Construct a leg riding `trip` from position `board_idx` to `alight_idx`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `alight_idx <= board_idx` or either index is out of
    /// bounds for the trip's stop sequence.
    pub fn new(trip: &Trip, board_idx: usize, alight_idx: usize) -> Result<Self, DomainError> {
        if alight_idx <= board_idx {
            return Err(DomainError::InvalidLeg(
                "alight index must be after board index",
            ));
        }

        let board = trip
            .stops
            .get(board_idx)
            .ok_or(DomainError::InvalidStopIndex)?;
        let alight = trip
            .stops
            .get(alight_idx)
            .ok_or(DomainError::InvalidStopIndex)?;

        Ok(Leg {
            trip_id: trip.id.clone(),
            from_stop: board.stop_id.clone(),
            to_stop: alight.stop_id.clone(),
            departure_time: board.departure_time.or(board.arrival_time),
            arrival_time: alight.arrival_time.or(alight.departure_time),
        })
    }

    /// Time spent on board, if both ends carry times.
    pub fn ride_duration(&self) -> Option<Duration> {
        Some(self.arrival_time?.signed_duration_since(self.departure_time?))
    }
}
