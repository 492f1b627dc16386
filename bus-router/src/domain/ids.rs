//! Stop and trip identifier types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {reason}")]
pub struct InvalidId {
    reason: &'static str,
}

fn validate(s: &str) -> Result<&str, InvalidId> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(InvalidId {
            reason: "must not be empty",
        });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(InvalidId {
            reason: "must not contain control characters",
        });
    }
    Ok(trimmed)
}

/// Identifier of a stop in the static stop dataset.
///
/// The published datasets use integer ids, older exports use strings.
/// Both are accepted when deserializing. Ordering is numeric when both
/// ids are numeric, so `"9" < "10"`; numeric ids sort before non-numeric
/// ones, which compare lexicographically.
///
/// # Examples
///
/// ```
/// use bus_router::domain::StopId;
///
/// let a = StopId::parse("9").unwrap();
/// let b = StopId::parse("10").unwrap();
/// assert!(a < b);
/// assert!(StopId::parse("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        validate(s).map(|s| StopId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for StopId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for StopId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw JSON form of an id: integers in the published data, strings elsewhere.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(u64),
    Str(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Int(n) => n.to_string(),
            RawId::Str(s) => s,
        }
    }
}

impl<'de> Deserialize<'de> for StopId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawId::deserialize(deserializer)?.into_string();
        StopId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for StopId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Identifier of a trip in the remote trip dataset.
///
/// Trips are partitioned into shards by a fixed-length prefix of their id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripId(String);

impl TripId {
    /// Parse a trip id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidId> {
        validate(s).map(|s| TripId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The shard key for this trip: its first `len` characters.
    ///
    /// Ids shorter than `len` are their own shard key.
    ///
    /// ```
    /// use bus_router::domain::TripId;
    ///
    /// let id = TripId::parse("4021337").unwrap();
    /// assert_eq!(id.shard_prefix(3), "402");
    /// assert_eq!(TripId::parse("T1").unwrap().shard_prefix(3), "T1");
    /// ```
    pub fn shard_prefix(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Debug for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TripId({})", self.0)
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TripId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawId::deserialize(deserializer)?.into_string();
        TripId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for TripId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
