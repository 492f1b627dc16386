//! Wire types for the remote trip dataset.
//!
//! A trip chunk is a JSON object keyed by trip id:
//!
//! ```json
//! {
//!   "4021337": {
//!     "route_id": "42",
//!     "headsign": "EWA BEACH",
//!     "shape_id": "420087",
//!     "stops": [
//!       {"stop_id": 1040, "arrival_time": "5:12:00", "departure_time": "5:12:00"}
//!     ]
//!   }
//! }
//! ```
//!
//! Every field is optional here; `convert` decides which omissions make a
//! record unusable.

use std::collections::HashMap;

use serde::Deserialize;

/// A chunk as received: trip id → undecoded trip record.
///
/// Records are kept as raw JSON so that one malformed trip does not make
/// the whole chunk unreadable.
pub type RawChunk = HashMap<String, serde_json::Value>;

/// A trip record within a chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTrip {
    #[serde(default)]
    pub route_id: Option<RawScalar>,
    #[serde(default)]
    pub headsign: Option<String>,
    #[serde(default)]
    pub shape_id: Option<RawScalar>,
    #[serde(default)]
    pub stops: Option<Vec<serde_json::Value>>,
}

/// A stop-time entry within a trip record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStopTime {
    #[serde(default)]
    pub stop_id: Option<RawScalar>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
}

/// A string-or-number field. GTFS exporters disagree on which to use for ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Int(i64),
    Str(String),
}

impl RawScalar {
    pub fn into_string(self) -> String {
        match self {
            RawScalar::Int(n) => n.to_string(),
            RawScalar::Str(s) => s,
        }
    }
}

/// The published stop → trips index: stop id → trip ids.
pub type RawStopIndex = HashMap<String, Vec<RawScalar>>;
