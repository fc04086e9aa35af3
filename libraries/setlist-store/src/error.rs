//! Error types for the playlist store.

use crate::operation::Operation;
use setlist_client::ClientError;
use thiserror::Error;

/// A failed store operation.
///
/// Displays as the message recorded in the store's error slot: the remote
/// `detail` when the service sent one, else the operation's fallback.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct StoreError {
    operation: Operation,
    message: String,
    #[source]
    source: ClientError,
}

impl StoreError {
    pub(crate) fn remote(operation: Operation, source: ClientError) -> Self {
        let message = source
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| operation.fallback_message().to_string());

        Self {
            operation,
            message,
            source,
        }
    }

    /// The step that failed. For syncs this can be one of the re-fetches.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn client_error(&self) -> &ClientError {
        &self.source
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Tags a remote failure with the step it happened in.
pub(crate) trait RemoteResultExt<T> {
    fn during(self, operation: Operation) -> Result<T>;
}

impl<T> RemoteResultExt<T> for std::result::Result<T, ClientError> {
    fn during(self, operation: Operation) -> Result<T> {
        self.map_err(|e| StoreError::remote(operation, e))
    }
}
