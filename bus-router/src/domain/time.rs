//! GTFS service-day times.
//!
//! Stop times are published as "H:MM:SS" or "HH:MM:SS" strings measured from
//! midnight of the service day. Trips running past midnight use hours of 24
//! or more ("25:10:00"), so these are not wall-clock times and cannot be
//! represented as `NaiveTime`.

use std::fmt;

use chrono::Duration;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Upper bound on hours accepted in a service time (two full days).
const MAX_HOURS: u32 = 48;

/// Time of day on a service day, in seconds after its midnight.
///
/// # Examples
///
/// ```
/// use bus_router::domain::ServiceTime;
///
/// let t = ServiceTime::parse("25:10:00").unwrap();
/// assert_eq!(t.to_string(), "25:10:00");
/// assert!(t > ServiceTime::parse("23:59:59").unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Construct from seconds after service-day midnight.
    pub fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    /// Parse "H:MM:SS" or "HH:MM:SS".
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected H:MM:SS"));
        };

        if h.is_empty() || h.len() > 2 || m.len() != 2 || sec.len() != 2 {
            return Err(TimeError::new("expected H:MM:SS"));
        }

        let field = |part: &str| -> Result<u32, TimeError> {
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimeError::new("non-digit character"));
            }
            part.parse().map_err(|_| TimeError::new("non-digit character"))
        };

        let hours = field(h)?;
        let minutes = field(m)?;
        let seconds = field(sec)?;

        if hours >= MAX_HOURS {
            return Err(TimeError::new("hour out of range"));
        }
        if minutes >= 60 || seconds >= 60 {
            return Err(TimeError::new("minute or second out of range"));
        }

        Ok(Self(hours * 3600 + minutes * 60 + seconds))
    }

    /// Seconds after service-day midnight.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Signed duration from `earlier` to `self`.
    pub fn signed_duration_since(&self, earlier: ServiceTime) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(earlier.0))
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

impl serde::Serialize for ServiceTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        assert_eq!(ServiceTime::parse("00:00:00").unwrap().seconds(), 0);
        assert_eq!(ServiceTime::parse("7:05:30").unwrap().seconds(), 25_530);
        assert_eq!(ServiceTime::parse("23:59:59").unwrap().seconds(), 86_399);
        assert_eq!(ServiceTime::parse("24:00:00").unwrap().seconds(), 86_400);
    }

    #[test]
    fn parse_trims() {
        assert_eq!(
            ServiceTime::parse(" 08:00:00 ").unwrap(),
            ServiceTime::from_seconds(28_800)
        );
    }

    #[test]
    fn reject_malformed() {
        assert!(ServiceTime::parse("").is_err());
        assert!(ServiceTime::parse("08:00").is_err());
        assert!(ServiceTime::parse("08:00:00:00").is_err());
        assert!(ServiceTime::parse("8:0:00").is_err());
        assert!(ServiceTime::parse("08:60:00").is_err());
        assert!(ServiceTime::parse("08:00:60").is_err());
        assert!(ServiceTime::parse("48:00:00").is_err());
        assert!(ServiceTime::parse("+8:00:00").is_err());
        assert!(ServiceTime::parse("ab:cd:ef").is_err());
    }

    #[test]
    fn display_pads() {
        let t = ServiceTime::parse("7:05:09").unwrap();
        assert_eq!(t.to_string(), "07:05:09");
        assert_eq!(format!("{t:?}"), "ServiceTime(07:05:09)");
    }

    #[test]
    fn duration_between() {
        let a = ServiceTime::parse("08:00:00").unwrap();
        let b = ServiceTime::parse("08:25:00").unwrap();
        assert_eq!(b.signed_duration_since(a), Duration::minutes(25));
        assert_eq!(a.signed_duration_since(b), Duration::minutes(-25));
    }

    #[test]
    fn serializes_as_string() {
        let t = ServiceTime::parse("25:10:00").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"25:10:00\"");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range time formats and parses back to itself
        #[test]
        fn display_parses_back(secs in 0u32..(MAX_HOURS * 3600)) {
            let t = ServiceTime::from_seconds(secs);
            prop_assert_eq!(ServiceTime::parse(&t.to_string()).unwrap(), t);
        }

        /// Ordering agrees with the underlying seconds
        #[test]
        fn ordering(a in 0u32..172_800, b in 0u32..172_800) {
            let (x, y) = (ServiceTime::from_seconds(a), ServiceTime::from_seconds(b));
            prop_assert_eq!(x.cmp(&y), a.cmp(&b));
        }
    }
}
