//! Web layer for the bus itinerary resolver.
//!
//! Provides HTTP endpoints for finding nearby stops, looking up trips and
//! planning itineraries.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
