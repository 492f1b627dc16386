//! Geocoder error types.

/// Errors that can occur when resolving free text to a location.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Geocoder returned an error status
    #[error("geocoder error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Configured endpoint is not a valid URL
    #[error("invalid geocoder URL: {message}")]
    InvalidUrl { message: String },

    /// Query was blank
    #[error("empty destination query")]
    EmptyQuery,

    /// No candidates for the query
    #[error("no location found for {query:?}")]
    NotFound { query: String },
}

impl GeocodeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeocodeError::NotFound { .. })
    }
}
