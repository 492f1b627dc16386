//! Domain types for the bus itinerary resolver.
//!
//! This module contains the core domain model types that represent
//! validated transit data. Types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod error;
mod geo;
mod ids;
mod itinerary;
mod leg;
mod stop;
mod time;
mod trip;

pub use error::DomainError;
pub use geo::{EARTH_RADIUS_M, LatLon, distance};
pub use ids::{InvalidId, StopId, TripId};
pub use itinerary::Itinerary;
pub use leg::Leg;
pub use stop::Stop;
pub use time::{ServiceTime, TimeError};
pub use trip::{StopTime, Trip};
