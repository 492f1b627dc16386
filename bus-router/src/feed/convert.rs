//! Conversion from wire types to domain types.
//!
//! Malformed records are skipped rather than failing the whole chunk: a trip
//! without a usable stop list, or a stop-time without a stop id, is dropped
//! with a debug log. Unparseable times become absent.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{InvalidId, ServiceTime, StopId, StopTime, Trip, TripId};

use super::types::{RawChunk, RawStopIndex, RawStopTime, RawTrip};

/// A decoded chunk: every usable trip in one shard.
pub type TripChunk = HashMap<TripId, Arc<Trip>>;

/// Stop → trips index, as published alongside the dataset.
pub type StopTripIndex = HashMap<StopId, Vec<TripId>>;

/// Error converting a single record.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid trip id {0:?}: {1}")]
    InvalidTripId(String, InvalidId),

    #[error("trip record is not an object: {0}")]
    NotATrip(String),

    #[error("trip {0} has no stop list")]
    MissingStops(String),

    #[error("stop-time entry has no usable stop_id")]
    MissingStopId,

    #[error("stop-time entry is not an object: {0}")]
    NotAStopTime(String),
}

/// Decode every usable trip in a chunk.
pub fn convert_chunk(raw: RawChunk) -> TripChunk {
    let mut chunk = HashMap::with_capacity(raw.len());

    for (id, value) in raw {
        match convert_trip(&id, value) {
            Ok(trip) => {
                chunk.insert(trip.id.clone(), Arc::new(trip));
            }
            Err(e) => debug!(trip = %id, error = %e, "Skipping malformed trip record"),
        }
    }

    chunk
}

/// Decode one trip record.
pub fn convert_trip(id: &str, value: serde_json::Value) -> Result<Trip, ConversionError> {
    let trip_id =
        TripId::parse(id).map_err(|e| ConversionError::InvalidTripId(id.to_string(), e))?;

    let raw: RawTrip =
        serde_json::from_value(value).map_err(|e| ConversionError::NotATrip(e.to_string()))?;

    let raw_stops = raw
        .stops
        .ok_or_else(|| ConversionError::MissingStops(id.to_string()))?;

    let stops = raw_stops
        .into_iter()
        .filter_map(|v| match convert_stop_time(v) {
            Ok(st) => Some(st),
            Err(e) => {
                debug!(trip = %id, error = %e, "Skipping malformed stop-time entry");
                None
            }
        })
        .collect();

    Ok(Trip {
        id: trip_id,
        shape_id: raw.shape_id.map(|s| s.into_string()),
        route_id: raw.route_id.map(|s| s.into_string()),
        headsign: raw.headsign.filter(|h| !h.trim().is_empty()),
        stops,
    })
}

fn convert_stop_time(value: serde_json::Value) -> Result<StopTime, ConversionError> {
    let raw: RawStopTime =
        serde_json::from_value(value).map_err(|e| ConversionError::NotAStopTime(e.to_string()))?;

    let stop_id = raw
        .stop_id
        .map(|s| s.into_string())
        .and_then(|s| StopId::parse(&s).ok())
        .ok_or(ConversionError::MissingStopId)?;

    let parse_time = |s: Option<String>| s.and_then(|s| ServiceTime::parse(&s).ok());

    Ok(StopTime::new(
        stop_id,
        parse_time(raw.arrival_time),
        parse_time(raw.departure_time),
    ))
}

/// Decode the published stop index, dropping unusable ids.
pub fn convert_stop_index(raw: RawStopIndex) -> StopTripIndex {
    raw.into_iter()
        .filter_map(|(stop, trips)| {
            let stop = StopId::parse(&stop).ok()?;
            let mut trips: Vec<TripId> = trips
                .into_iter()
                .filter_map(|t| TripId::parse(&t.into_string()).ok())
                .collect();
            trips.sort();
            trips.dedup();
            Some((stop, trips))
        })
        .collect()
}
