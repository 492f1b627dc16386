//! Itinerary planner using BFS search.
//!
//! This module answers: "I'm standing here - which buses get me near my
//! destination?" It ranks start stops by proximity, then runs a
//! bounded-transfer breadth-first search over trips fetched through the
//! trip cache.

mod config;
mod generation;
mod nearest;
mod search;

pub use config::ResolverConfig;
pub use generation::{Generation, SearchGenerations, Tagged};
pub use nearest::nearest;
pub use search::{Resolver, SearchOutcome};
