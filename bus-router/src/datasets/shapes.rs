//! Route shape catalog.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::LatLon;

use super::DatasetError;

/// Route geometries keyed by shape id.
///
/// Built once at startup from `shapes.json`
/// (`{shapeId: [[lat, lon], ...]}`, points already in sequence order).
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: HashMap<String, Vec<LatLon>>,
}

impl ShapeCatalog {
    pub fn from_shapes(shapes: HashMap<String, Vec<LatLon>>) -> Self {
        Self { shapes }
    }

    /// Parse the shape dataset.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let raw: HashMap<String, Vec<[f64; 2]>> =
            serde_json::from_str(json).map_err(|e| DatasetError::Json {
                what: "shape dataset",
                message: e.to_string(),
            })?;

        let shapes = raw
            .into_iter()
            .map(|(id, points)| {
                let coords = points
                    .into_iter()
                    .map(|[lat, lon]| LatLon::new(lat, lon))
                    .filter(LatLon::is_valid)
                    .collect();
                (id, coords)
            })
            .collect();

        Ok(Self { shapes })
    }

    /// Load the shape dataset from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_json_str(&super::read_file(path.as_ref())?)
    }

    /// Ordered coordinates of a shape.
    pub fn get(&self, shape_id: &str) -> Option<&[LatLon]> {
        self.shapes.get(shape_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
