//! Error types for the Setlist client.

use thiserror::Error;

/// Errors that can occur when talking to the remote playlist service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server error ({status}): {body}")]
    Remote {
        status: u16,
        /// Human-readable `detail` field of the error body, if it had one
        detail: Option<String>,
        /// Raw response body
        body: String,
    },

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl ClientError {
    /// The `detail` message the server attached to a failure response.
    ///
    /// `None` for transport failures and for error bodies without a
    /// string `detail`.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Remote { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Build a remote error from a failed response body.
    pub(crate) fn from_response(status: u16, body: String) -> Self {
        let detail = serde_json::from_str::<crate::types::ApiError>(&body)
            .ok()
            .and_then(|e| e.detail)
            .and_then(|d| match d {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            });

        ClientError::Remote {
            status,
            detail,
            body,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
