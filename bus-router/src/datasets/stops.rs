//! Stop catalog.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::domain::{LatLon, Stop, StopId};
use crate::planner::nearest;

use super::DatasetError;

/// All known stops, with lookup by id.
///
/// Built once at startup from `stops.json` (`[{id, lat, lon}, ...]`).
#[derive(Debug, Clone, Default)]
pub struct StopCatalog {
    stops: Vec<Stop>,
    by_id: HashMap<StopId, usize>,
}

impl StopCatalog {
    /// Build a catalog from stops. Later duplicates of an id are dropped.
    pub fn from_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        let mut catalog = Self::default();
        for stop in stops {
            if catalog.by_id.contains_key(&stop.id) {
                debug!(stop = %stop.id, "Dropping duplicate stop");
                continue;
            }
            if !stop.coord().is_valid() {
                debug!(stop = %stop.id, "Dropping stop with invalid coordinates");
                continue;
            }
            catalog.by_id.insert(stop.id.clone(), catalog.stops.len());
            catalog.stops.push(stop);
        }
        catalog
    }

    /// Parse the stop dataset, skipping malformed records.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let records: Vec<serde_json::Value> =
            serde_json::from_str(json).map_err(|e| DatasetError::Json {
                what: "stop dataset",
                message: e.to_string(),
            })?;

        let stops = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Stop>(record) {
                Ok(stop) => Some(stop),
                Err(e) => {
                    debug!(error = %e, "Skipping malformed stop record");
                    None
                }
            });

        Ok(Self::from_stops(stops))
    }

    /// Load the stop dataset from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_json_str(&super::read_file(path.as_ref())?)
    }

    /// Look up a stop by id.
    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.by_id.get(id).map(|&i| &self.stops[i])
    }

    /// All stops, in dataset order.
    pub fn all(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// The `k` stops closest to `point`, nearest first.
    pub fn nearest(&self, point: LatLon, k: usize) -> Vec<Stop> {
        nearest(&self.stops, point, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_skips_malformed_records() {
        let catalog = StopCatalog::from_json_str(
            r#"[
                {"id": 1, "lat": 21.30, "lon": -157.85},
                {"id": 2, "lat": "north", "lon": -157.85},
                {"lat": 21.31, "lon": -157.86},
                {"id": "3", "lat": 21.32, "lon": -157.87}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(&StopId::parse("1").unwrap()).is_some());
        assert!(catalog.get(&StopId::parse("2").unwrap()).is_none());
        assert!(catalog.get(&StopId::parse("3").unwrap()).is_some());
    }

    #[test]
    fn duplicates_keep_first() {
        let id = StopId::parse("1").unwrap();
        let catalog = StopCatalog::from_stops(vec![
            Stop::new(id.clone(), 1.0, 1.0),
            Stop::new(id.clone(), 2.0, 2.0),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&id).unwrap().lat, 1.0);
    }

    #[test]
    fn invalid_coordinates_dropped() {
        let catalog = StopCatalog::from_stops(vec![Stop::new(
            StopId::parse("1").unwrap(),
            123.0,
            0.0,
        )]);
        assert!(catalog.is_empty());
    }

    #[test]
    fn not_an_array_is_error() {
        assert!(matches!(
            StopCatalog::from_json_str(r#"{"id": 1}"#),
            Err(DatasetError::Json { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 47, "lat": 21.3, "lon": -157.8}}]"#).unwrap();

        let catalog = StopCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.all()[0].id.as_str(), "47");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            StopCatalog::load("/nonexistent/stops.json"),
            Err(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn bundled_dataset_loads() {
        let catalog = StopCatalog::load("data/stops.json").unwrap();
        assert_eq!(catalog.len(), 6);
        let nearest = catalog.nearest(LatLon::new(21.3069, -157.8583), 2);
        assert_eq!(nearest[0].id.as_str(), "1");
        assert_eq!(nearest[1].id.as_str(), "2");
    }
}
