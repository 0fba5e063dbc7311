//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot not found for the given document
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    /// Invalid document or snapshot identifier
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A save would exceed the configured capacity limits
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A storage call did not complete within its deadline
    #[error("Storage operation timed out")]
    Timeout,

    /// Lock was poisoned (another thread panicked while holding the lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StorageError {
    /// Create a not found error for a snapshot within a document.
    pub fn not_found(document_id: &str, snapshot_id: &str) -> Self {
        Self::NotFound(format!("{document_id}/{snapshot_id}"))
    }

    /// Create an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Create a quota exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_not_found_formats_key() {
        let err = StorageError::not_found("doc_123", "snp_456");
        assert_eq!(err.to_string(), "Snapshot not found: doc_123/snp_456");
    }

    #[test]
    fn storage_error_invalid_key_formats_message() {
        let err = StorageError::invalid_key("empty document id");
        assert_eq!(err.to_string(), "Invalid key: empty document id");
    }

    #[test]
    fn storage_error_io_wraps_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from(io_err);
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn storage_error_json_wraps_serde_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err = StorageError::from(json_err);
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn storage_error_quota_exceeded_displays() {
        let err = StorageError::quota_exceeded("2 of 2 snapshots used");
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn storage_error_timeout_displays() {
        assert_eq!(
            StorageError::Timeout.to_string(),
            "Storage operation timed out"
        );
    }
}
