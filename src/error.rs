//! textlabel error types

use std::time::Duration;

/// textlabel error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Rendering errors
    #[error("chart error: {0}")]
    Chart(String),
}

impl Error {
    /// Whether the error came from talking to the model service, as opposed
    /// to local data handling.
    pub fn is_service(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::Api { .. }
                | Error::RateLimited { .. }
                | Error::AuthenticationFailed
                | Error::ModelNotFound(_)
                | Error::EmptyResponse
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

/// Result type alias for textlabel operations
pub type Result<T> = std::result::Result<T, Error>;
