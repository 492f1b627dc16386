//! Static dataset error types.

use std::path::PathBuf;

/// Errors loading the static stop or shape datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// File could not be read
    #[error("failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// File is not valid JSON of the expected shape
    #[error("JSON parse error in {what}: {message}")]
    Json { what: &'static str, message: String },
}
