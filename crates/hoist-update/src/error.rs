//! Error types for the update engine

use std::fmt;
use thiserror::Error;

/// Result type alias using hoist-update's error type
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Failure of one update step
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The release feed is missing required fields, or no asset resolved to a URL
    #[error("Invalid release feed response: {message}")]
    MalformedResponse { message: String },

    /// Timeout, connection failure, HTTP error status or truncated stream
    #[error("Network error: {message}")]
    Network { message: String },

    /// The user aborted the transfer
    #[error("Cancelled by user")]
    Cancelled,

    /// Local filesystem failure while backing up, writing or restoring
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of an [`UpdateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedResponse,
    Network,
    Cancelled,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::Network => "network error",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Io => "I/O error",
        };
        f.write_str(name)
    }
}

impl UpdateError {
    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with a description of what was being done
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            UpdateError::Network { .. } => ErrorKind::Network,
            UpdateError::Cancelled => ErrorKind::Cancelled,
            UpdateError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Whether this is a user cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UpdateError::Cancelled)
    }
}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("read timed out: {}", err))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(format!("body is not valid JSON: {}", err))
    }
}
