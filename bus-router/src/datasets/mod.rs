//! Static datasets shipped with the app.
//!
//! Stops and route shapes are small enough to load once at startup and
//! never change for the lifetime of the process.

mod error;
mod shapes;
mod stops;

pub use error::DatasetError;
pub use shapes::ShapeCatalog;
pub use stops::StopCatalog;

use std::path::Path;

fn read_file(path: &Path) -> Result<String, DatasetError> {
    std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
