//! Error types for the bot

use thiserror::Error;

/// Bot-wide error type
#[derive(Error, Debug)]
pub enum CaseBotError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CaseBotError {
    pub fn api(msg: impl Into<String>) -> Self {
        CaseBotError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        CaseBotError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        CaseBotError::Parse(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        CaseBotError::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        CaseBotError::Config(msg.into())
    }
}

/// Result type alias for bot operations
pub type CaseBotResult<T> = Result<T, CaseBotError>;
