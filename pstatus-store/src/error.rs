//! Error types for the store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur when talking to a store backend
///
/// A missing key is deliberately absent from this list: `Store::fetch`
/// reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Backend returned a non-success status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body returned by the backend
        message: String,
    },

    /// Endpoint could not be parsed
    #[error("Invalid endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Store configuration is unusable
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Credentials could not be resolved
    #[error("Failed to resolve credentials: {0}")]
    Credentials(String),

    /// Request could not be signed
    #[error("Failed to sign request: {0}")]
    Signing(String),

    /// Failure reported by a non-HTTP backend
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is worth retrying (transport failures, throttling, 5xx)
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}
