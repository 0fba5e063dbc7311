//! Error types for the core crate.

use redline_storage::StorageError;
use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot not found.
    #[error("snapshot not found: {0}")]
    NotFound(String),

    /// The safety snapshot failed to persist, so the restore did not
    /// proceed. Current content is guaranteed untouched.
    #[error("restore aborted: {0}")]
    RestoreAborted(String),

    /// The content accessor failed to read or replace document content.
    #[error("content accessor error: {0}")]
    Content(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
