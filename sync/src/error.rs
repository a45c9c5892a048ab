//! Error types for the sync runtime.

use thiserror::Error;

/// Failures surfaced by the sync runtime.
///
/// `Clone` so the outcome of an in-flight sync cycle can be shared with
/// every caller attached to it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("remote store error: {0}")]
    Remote(String),

    #[error("local storage error: {0}")]
    Storage(String),

    #[error("transfer error: {0}")]
    Transfer(#[from] retake_engine::Error),
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
