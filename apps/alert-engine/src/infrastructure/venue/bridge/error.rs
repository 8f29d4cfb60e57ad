//! Bridge-specific error types.

use thiserror::Error;

use crate::application::ports::VenueError;

/// Errors from the bridge adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// HTTP client could not be built or the request could not be sent.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Network error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// Bridge answered with a non-success status.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the bridge.
        code: String,
        /// Error message from the bridge.
        message: String,
    },

    /// Terminal login refused or session expired.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Resource does not exist.
    #[error("Not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Response body did not decode.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Bridge answered with a value the engine cannot represent.
    #[error("Unexpected value: {0}")]
    Unexpected(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

impl From<BridgeError> for VenueError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Http(message) | BridgeError::Network(message) => {
                Self::Connection { message }
            }
            BridgeError::MaxRetriesExceeded { attempts } => Self::Connection {
                message: format!("max retries exceeded after {attempts} attempts"),
            },
            BridgeError::RateLimited { retry_after_secs } => Self::Connection {
                message: format!("rate limited, retry after {retry_after_secs}s"),
            },
            BridgeError::AuthenticationFailed => Self::Refused {
                message: "authentication failed".to_string(),
            },
            BridgeError::Api { code, message } => Self::Protocol {
                message: format!("{code}: {message}"),
            },
            BridgeError::NotFound { path } => Self::Protocol {
                message: format!("not found: {path}"),
            },
            BridgeError::JsonParse(message) | BridgeError::Unexpected(message) => {
                Self::Protocol { message }
            }
        }
    }
}
