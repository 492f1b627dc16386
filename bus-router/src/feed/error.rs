//! Trip feed error types.

use std::fmt;

/// Errors from fetching remote trip data.
#[derive(Debug)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Endpoint returned an error status code
    Api { status: u16, message: String },

    /// The requested chunk does not exist
    NotFound { resource: String },

    /// Local data could not be read (mock source)
    Io { message: String },
}

impl FetchError {
    /// Whether the error means "this resource does not exist" rather than
    /// "the fetch went wrong".
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "HTTP error: {e}"),
            FetchError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            FetchError::Api { status, message } => write!(f, "API error {status}: {message}"),
            FetchError::NotFound { resource } => write!(f, "not found: {resource}"),
            FetchError::Io { message } => write!(f, "I/O error: {message}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(err)
    }
}
