//! Error types for evdash
//!
//! Every failure the client can produce surfaces as an [`Error`]. Callers that only
//! care about the broad category (for example to decide whether to retry or to show
//! a message) can match on [`Error::kind`] instead of the individual variants.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for evdash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for evdash
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// A required request parameter was missing or blank
    #[error("invalid input: {field} must not be empty")]
    InvalidInput {
        /// Name of the offending parameter
        field: String,
    },

    /// Network error (connection refused, request timeout, TLS, ...)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not valid JSON for the expected shape
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response was well-formed JSON but missing required fields
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The service explicitly reported a failure
    #[error("service error: {message}")]
    Service {
        /// Server-supplied message, or a generic fallback
        message: String,
        /// HTTP status of the response, when the failure came with a non-2xx status
        status: Option<u16>,
    },

    /// The polling budget ran out while the task was still in progress
    #[error("task {task_id} did not finish within {elapsed:?}")]
    Timeout {
        /// The task that was being polled
        task_id: String,
        /// Time elapsed since the poll session started
        elapsed: Duration,
    },

    /// The caller cancelled the poll session
    #[error("polling of task {task_id} was cancelled")]
    Cancelled {
        /// The task that was being polled
        task_id: String,
    },
}

/// Broad classification of an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network failure or an unparseable response
    TransportError,
    /// The remote service reported failure
    ServiceError,
    /// Polling budget exceeded
    Timeout,
    /// Caller-initiated stop
    Cancelled,
    /// Missing or blank required parameter
    InvalidInput,
    /// Invalid client configuration
    Config,
}

impl Error {
    /// Build a [`Error::Service`] from an optional server message, falling back to `fallback`
    pub fn service(message: Option<String>, fallback: &str, status: Option<u16>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Error::Service { message, status }
    }

    /// Get the broad category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } => ErrorKind::Config,
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::Network(_) | Error::Serialization(_) | Error::MalformedResponse(_) => {
                ErrorKind::TransportError
            }
            Error::Service { .. } => ErrorKind::ServiceError,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Server-supplied message for [`Error::Service`], `None` for every other variant
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Error::Service { message, .. } => Some(message),
            _ => None,
        }
    }
}
