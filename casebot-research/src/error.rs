//! Error types for the generative-model collaborator

use thiserror::Error;

/// Errors from a single model call
#[derive(Debug, Error)]
pub enum ModelError {
    /// The credential's quota or rate limit is used up
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The API returned a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response carried no generated text
    #[error("Empty response from model")]
    EmptyResponse,

    /// The generated text was not the expected JSON
    #[error("Malformed JSON from model: {0}")]
    MalformedJson(String),
}

impl ModelError {
    pub fn is_quota(&self) -> bool {
        matches!(self, ModelError::QuotaExhausted(_))
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        ModelError::RequestFailed(e.to_string())
    }
}
