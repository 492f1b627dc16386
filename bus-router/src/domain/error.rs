//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from API/IO errors.

use super::StopId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Stop index is out of bounds for the trip
    #[error("invalid stop index: out of bounds")]
    InvalidStopIndex,

    /// Invalid leg construction (e.g., alight before board)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Consecutive legs don't share a transfer stop
    #[error("legs do not connect: {0} then {1}")]
    LegsNotConnected(StopId, StopId),

    /// The final stop is not where the last leg ends
    #[error("final stop {final_stop} does not match last leg destination {last_leg}")]
    FinalStopMismatch { final_stop: StopId, last_leg: StopId },

    /// Itinerary has no legs
    #[error("itinerary must have at least one leg")]
    EmptyItinerary,
}
