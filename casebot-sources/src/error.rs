//! Error types for the source adapters

use thiserror::Error;

/// Errors that can occur while fetching from a source
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Source returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Source throttled the request
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::ParseError(e.to_string())
        } else {
            SourceError::RequestFailed(e.to_string())
        }
    }
}
