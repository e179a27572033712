//! Indra Error Types
//!
//! A single error type for every failure the client can report. Each variant
//! carries a message; the variant only records where the failure came from.

use thiserror::Error;

/// Main error type for Indra client operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndraError {
    /// The service answered with a non-200 status. The message is the raw body.
    #[error("{0}")]
    Service(String),

    /// An argument was rejected before any request was made
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(String),

    /// Response parsing failed or an expected field was missing
    #[error("Response error: {0}")]
    Response(String),

    /// Configuration errors (unreadable file, invalid JSON, bad values)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IndraError {
    /// The message carried by this error, without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            IndraError::Service(msg)
            | IndraError::InvalidArgument(msg)
            | IndraError::Request(msg)
            | IndraError::Response(msg)
            | IndraError::Config(msg) => msg,
        }
    }

    /// Build a response error for a field the service did not return
    pub(crate) fn missing_field(field: &str) -> Self {
        IndraError::Response(format!("missing field '{}' in service response", field))
    }
}

impl From<reqwest::Error> for IndraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            IndraError::Response(format!("Failed to decode response: {}", err))
        } else if err.is_connect() {
            IndraError::Request(format!("Connection failed: {}", err))
        } else if err.is_timeout() {
            IndraError::Request(format!("Request timed out: {}", err))
        } else {
            IndraError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for IndraError {
    fn from(err: serde_json::Error) -> Self {
        IndraError::Response(format!("JSON parsing error: {}", err))
    }
}

impl From<std::io::Error> for IndraError {
    fn from(err: std::io::Error) -> Self {
        IndraError::Config(format!("IO error: {}", err))
    }
}

/// Result type alias for Indra operations
pub type Result<T> = std::result::Result<T, IndraError>;
