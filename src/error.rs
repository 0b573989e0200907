//! Error types for the Understudy pipeline
//!
//! This module provides structured error handling using thiserror, with
//! anyhow accepted at the binary boundary for error propagation.

use thiserror::Error;

/// Main error type for Understudy operations
#[derive(Error, Debug)]
pub enum UnderstudyError {
    /// Scratchpad database operation failed
    #[error("Scratchpad error: {0}")]
    Scratchpad(#[from] rusqlite::Error),

    /// LLM API request failed
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM returned output the parser could not make sense of
    #[error("Unparseable LLM response: {0}")]
    LlmResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown project name
    #[error("Unknown project: {0}")]
    UnknownProject(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Replay input could not be read
    #[error("Replay error: {0}")]
    Replay(#[from] csv::Error),

    /// Invalid operation (e.g., empty task description at deploy time)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Understudy operations
pub type Result<T> = std::result::Result<T, UnderstudyError>;

/// Convert anyhow::Error to UnderstudyError
impl From<anyhow::Error> for UnderstudyError {
    fn from(err: anyhow::Error) -> Self {
        UnderstudyError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UnderstudyError::UnknownProject("Side Quest".to_string());
        assert_eq!(err.to_string(), "Unknown project: Side Quest");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: UnderstudyError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, UnderstudyError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
