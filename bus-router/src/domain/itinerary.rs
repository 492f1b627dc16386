//! Itinerary type: an ordered sequence of legs ending at a final stop.

use serde::Serialize;

use super::{DomainError, Leg, Stop, StopId};

/// A complete rider journey.
///
/// Leg order is traversal order. The itinerary is the first one the
/// resolver found, not necessarily the one with the fewest legs or the
/// earliest arrival.
///
/// # Invariants
///
/// - At least one leg
/// - Each leg starts where the previous one ended
/// - `final_stop` is where the last leg ends
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    legs: Vec<Leg>,
    final_stop: Stop,
}

impl Itinerary {
    /// Build an itinerary, validating leg continuity.
    pub fn new(legs: Vec<Leg>, final_stop: Stop) -> Result<Self, DomainError> {
        let last = legs.last().ok_or(DomainError::EmptyItinerary)?;

        if last.to_stop != final_stop.id {
            return Err(DomainError::FinalStopMismatch {
                final_stop: final_stop.id.clone(),
                last_leg: last.to_stop.clone(),
            });
        }

        for pair in legs.windows(2) {
            if pair[0].to_stop != pair[1].from_stop {
                return Err(DomainError::LegsNotConnected(
                    pair[0].to_stop.clone(),
                    pair[1].from_stop.clone(),
                ));
            }
        }

        Ok(Self { legs, final_stop })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn final_stop(&self) -> &Stop {
        &self.final_stop
    }

    /// Number of changes between trips.
    pub fn transfers(&self) -> usize {
        self.legs.len() - 1
    }

    /// Stops where the rider changes bus, in order.
    pub fn transfer_stops(&self) -> impl Iterator<Item = &StopId> {
        let n = self.legs.len() - 1;
        self.legs[..n].iter().map(|leg| &leg.to_stop)
    }
}
