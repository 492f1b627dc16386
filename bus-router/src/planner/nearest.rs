//! Nearest-stop selection.

use std::cmp::Ordering;

use crate::domain::{LatLon, Stop};

/// The `k` stops closest to `point`, nearest first.
///
/// Returns `min(k, stops.len())` stops. Ties in distance are broken by
/// ascending stop id. Does not reorder `stops`.
///
/// # Examples
///
/// ```
/// use bus_router::domain::{LatLon, Stop, StopId};
/// use bus_router::planner::nearest;
///
/// let stops = vec![
///     Stop::new(StopId::parse("far").unwrap(), 0.0, 1.0),
///     Stop::new(StopId::parse("near").unwrap(), 0.0, 0.1),
/// ];
/// let ranked = nearest(&stops, LatLon::new(0.0, 0.0), 5);
/// assert_eq!(ranked[0].id.as_str(), "near");
/// assert_eq!(ranked.len(), 2);
/// ```
pub fn nearest(stops: &[Stop], point: LatLon, k: usize) -> Vec<Stop> {
    if k == 0 || stops.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(f64, &Stop)> = stops
        .iter()
        .map(|stop| (stop.distance_to(&point), stop))
        .collect();

    // Partition first so only the k winners need a full sort.
    if k < ranked.len() {
        ranked.select_nth_unstable_by(k - 1, by_distance_then_id);
        ranked.truncate(k);
    }
    ranked.sort_by(by_distance_then_id);

    ranked.into_iter().map(|(_, stop)| stop.clone()).collect()
}

fn by_distance_then_id(a: &(f64, &Stop), b: &(f64, &Stop)) -> Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;

    fn stop(id: &str, lat: f64, lon: f64) -> Stop {
        Stop::new(StopId::parse(id).unwrap(), lat, lon)
    }

    fn ids(stops: &[Stop]) -> Vec<&str> {
        stops.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn empty_input() {
        assert!(nearest(&[], LatLon::new(0.0, 0.0), 3).is_empty());
    }

    #[test]
    fn k_zero() {
        let stops = vec![stop("1", 0.0, 0.0)];
        assert!(nearest(&stops, LatLon::new(0.0, 0.0), 0).is_empty());
    }

    #[test]
    fn sorted_by_distance() {
        let stops = vec![
            stop("1", 0.0, 0.03),
            stop("2", 0.0, 0.01),
            stop("3", 0.0, 0.02),
            stop("4", 0.0, 0.04),
        ];
        let ranked = nearest(&stops, LatLon::new(0.0, 0.0), 3);
        assert_eq!(ids(&ranked), vec!["2", "3", "1"]);
    }

    #[test]
    fn ties_broken_by_ascending_id() {
        // Equidistant east and west of the origin; ids compare numerically.
        let stops = vec![stop("10", 0.0, 0.01), stop("9", 0.0, -0.01), stop("11", 0.0, 0.01)];
        let ranked = nearest(&stops, LatLon::new(0.0, 0.0), 3);
        assert_eq!(ids(&ranked), vec!["9", "10", "11"]);
    }

    #[test]
    fn input_not_reordered() {
        let stops = vec![stop("1", 0.0, 0.03), stop("2", 0.0, 0.01)];
        let _ = nearest(&stops, LatLon::new(0.0, 0.0), 1);
        assert_eq!(ids(&stops), vec!["1", "2"]);
    }
}
