//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Itinerary, LatLon, Leg, Stop};
use crate::overlay::RouteOverlay;
use crate::planner::SearchOutcome;

/// Query for the nearest stops to a point.
#[derive(Debug, Deserialize)]
pub struct NearestStopsRequest {
    pub lat: f64,
    pub lon: f64,

    /// Number of stops (default 5)
    pub k: Option<usize>,
}

/// A stop with its distance from the queried point.
#[derive(Debug, Serialize)]
pub struct NearbyStop {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub distance_m: f64,
}

impl NearbyStop {
    pub fn new(stop: &Stop, from: &LatLon) -> Self {
        Self {
            id: stop.id.to_string(),
            lat: stop.lat,
            lon: stop.lon,
            distance_m: stop.distance_to(from),
        }
    }
}

/// Response with nearby stops, nearest first.
#[derive(Debug, Serialize)]
pub struct NearestStopsResponse {
    pub stops: Vec<NearbyStop>,
}

/// Request to plan an itinerary.
///
/// The destination is either given directly or geocoded from `query`.
#[derive(Debug, Deserialize)]
pub struct PlanItineraryRequest {
    /// Where the rider is now
    pub origin: LatLon,

    /// Destination coordinates; takes precedence over `query`
    pub destination: Option<LatLon>,

    /// Free-text destination
    pub query: Option<String>,

    /// Transfer bound (defaults to the server setting)
    pub max_transfers: Option<usize>,

    /// Number of start stops near the origin
    pub start_stops: Option<usize>,
}

/// Whether a plan found a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Found,
    NoRoute,
}

/// A leg in the response.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub trip_id: String,
    pub from_stop: String,
    pub to_stop: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,

    /// Time on the bus, when both ends have times
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_mins: Option<i64>,
}

impl LegResult {
    pub fn from_leg(leg: &Leg) -> Self {
        Self {
            trip_id: leg.trip_id.to_string(),
            from_stop: leg.from_stop.to_string(),
            to_stop: leg.to_stop.to_string(),
            departure_time: leg.departure_time.map(|t| t.to_string()),
            arrival_time: leg.arrival_time.map(|t| t.to_string()),
            duration_mins: leg.ride_duration().map(|d| d.num_minutes()),
        }
    }
}

/// An itinerary in the response.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    pub legs: Vec<LegResult>,
    pub final_stop: Stop,
    pub transfers: usize,
}

impl ItineraryResult {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            legs: itinerary.legs().iter().map(LegResult::from_leg).collect(),
            final_stop: itinerary.final_stop().clone(),
            transfers: itinerary.transfers(),
        }
    }
}

/// Response from itinerary planning.
#[derive(Debug, Serialize)]
pub struct PlanItineraryResponse {
    pub status: PlanStatus,

    /// Coordinates searched for, after geocoding
    pub destination: LatLon,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<ItineraryResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<RouteOverlay>,

    /// Shards that failed to load; a `no_route` answer may be incomplete
    pub degraded_shards: Vec<String>,

    pub stops_expanded: usize,
    pub trips_expanded: usize,
}

impl PlanItineraryResponse {
    pub fn new(destination: LatLon, outcome: SearchOutcome, overlay: Option<RouteOverlay>) -> Self {
        let status = if outcome.is_found() {
            PlanStatus::Found
        } else {
            PlanStatus::NoRoute
        };

        Self {
            status,
            destination,
            itinerary: outcome
                .itinerary
                .as_ref()
                .map(ItineraryResult::from_itinerary),
            overlay,
            degraded_shards: outcome.degraded_shards,
            stops_expanded: outcome.stops_expanded,
            trips_expanded: outcome.trips_expanded,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
