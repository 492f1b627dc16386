//! Great-circle distance on a spherical Earth.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two WGS84 points given in degrees.
///
/// # Examples
///
/// ```
/// use bus_router::domain::distance;
///
/// assert_eq!(distance(21.3, -157.8, 21.3, -157.8), 0.0);
///
/// let d = distance(0.0, 0.0, 0.0, 0.003);
/// assert!((d - 333.6).abs() < 0.5);
/// ```
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal points.
    let a = a.min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Distance in meters to another point.
    pub fn distance_to(&self, other: &LatLon) -> f64 {
        distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Whether both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_distance_honolulu_to_kailua() {
        // Downtown Honolulu to Kailua is roughly 16 km as the crow flies.
        let honolulu = LatLon::new(21.3069, -157.8583);
        let kailua = LatLon::new(21.4022, -157.7394);
        let d = honolulu.distance_to(&kailua);
        assert!((12_000.0..20_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = distance(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn near_antipodes_stay_finite() {
        let d = distance(8.0, 0.0, -8.0, 180.0);
        assert!(d.is_finite(), "got {d}");
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }

    #[test]
    fn validity() {
        assert!(LatLon::new(21.3, -157.8).is_valid());
        assert!(!LatLon::new(91.0, 0.0).is_valid());
        assert!(!LatLon::new(0.0, f64::NAN).is_valid());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn lat() -> impl Strategy<Value = f64> {
        -90.0f64..=90.0
    }

    fn lon() -> impl Strategy<Value = f64> {
        -180.0f64..=180.0
    }

    proptest! {
        /// Distance from a point to itself is zero
        #[test]
        fn identity(a in lat(), b in lon()) {
            prop_assert_eq!(distance(a, b, a, b), 0.0);
        }

        /// Distance is symmetric
        #[test]
        fn symmetric(a in lat(), b in lon(), c in lat(), d in lon()) {
            let ab = distance(a, b, c, d);
            let ba = distance(c, d, a, b);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        /// Distance never exceeds half the circumference
        #[test]
        fn bounded(a in lat(), b in lon(), c in lat(), d in lon()) {
            let x = distance(a, b, c, d);
            prop_assert!(x >= 0.0);
            prop_assert!(x <= std::f64::consts::PI * EARTH_RADIUS_M + 1.0);
        }
    }
}
