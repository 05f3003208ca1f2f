//! Error types for the sync layer.

use pagemark_outline::OutlineError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure (connection refused, DNS, TLS, malformed response).
    #[error("network error: {0}")]
    Network(String),

    /// The remote collection answered with a non-success status.
    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local outline error (draft persistence, invalid edit).
    #[error(transparent)]
    Outline(#[from] OutlineError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Outline or publication not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Timeout.
    #[error("operation timed out")]
    Timeout,
}
