//! Error types for the colloquy client.

use thiserror::Error;

/// A shared error type for the whole client stack.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum ChatError {
    /// The request itself failed before a response arrived (offline, DNS,
    /// timeout).
    #[error("Network failure: {message}")]
    Network { message: String },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    /// No authenticated user is available for an operation that needs one.
    #[error("Not logged in")]
    MissingAuth,

    /// Configuration or credential file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an Http error
    pub fn http(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is an Http error
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Check if this error carries the given HTTP status.
    pub fn has_status(&self, code: u16) -> bool {
        matches!(self, Self::Http { status, .. } if *status == code)
    }

    /// Check if this is a MissingAuth error
    pub fn is_missing_auth(&self) -> bool {
        matches!(self, Self::MissingAuth)
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(format!("{} (kind: {:?})", err, err.kind()))
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
