//! Durable snapshot storage for redline.
//!
//! This crate provides the snapshot persistence contract with two
//! interchangeable backends:
//! - JSON file storage (larger capacity, preferred when a writable
//!   directory is available)
//! - In-memory storage (small capacity, always available)
//!
//! Backends are chosen at startup by [`detect::detect_store`]; callers
//! depend only on the [`SnapshotStore`] trait.

pub mod detect;
pub mod error;
pub mod json;
pub mod memory;
pub mod snapshot;

pub use detect::detect_store;
pub use error::{StorageError, StorageResult};
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotId};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Capacity limits enforced at the store boundary.
///
/// A save that would exceed a limit fails with
/// [`StorageError::QuotaExceeded`]; the store never silently truncates or
/// drops history. There is no automatic pruning: deletion is always an
/// explicit caller decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreLimits {
    /// Maximum number of snapshots per document.
    pub max_snapshots_per_document: Option<u32>,

    /// Maximum total bytes across all documents (approximate).
    pub max_total_bytes: Option<u64>,
}

/// Aggregate storage usage, for quota UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUsage {
    /// Total number of stored snapshots.
    pub snapshot_count: usize,

    /// Approximate total size in bytes.
    pub approximate_bytes: u64,

    /// Number of distinct documents with at least one snapshot.
    pub document_count: usize,
}

/// Durable CRUD for snapshots, scoped by document id.
///
/// Implementations must be safe to share across tasks. The engine assumes
/// a single writer per document (the snapshot manager serializes
/// captures); a deployment with multiple concurrent writers per document
/// would need compare-and-swap on `save`, which no current backend
/// provides.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Upsert a snapshot by id, keyed under its `document_id`.
    ///
    /// Succeeds or fails atomically; partial writes are not observable.
    async fn save(&self, snapshot: &Snapshot) -> StorageResult<()>;

    /// All snapshots for a document, in no particular order.
    async fn get_all(&self, document_id: &str) -> StorageResult<Vec<Snapshot>>;

    /// One snapshot, verified to belong to `document_id`.
    ///
    /// A snapshot stored under a different document is reported as
    /// [`StorageError::NotFound`], never returned.
    async fn get(&self, document_id: &str, snapshot_id: &SnapshotId) -> StorageResult<Snapshot>;

    /// Delete one snapshot.
    async fn delete(&self, document_id: &str, snapshot_id: &SnapshotId) -> StorageResult<()>;

    /// Delete every snapshot for a document.
    async fn delete_all(&self, document_id: &str) -> StorageResult<()>;

    /// Aggregate usage across all documents.
    async fn usage(&self) -> StorageResult<StorageUsage>;
}

/// Validate a key component (document or snapshot id) for path safety.
pub(crate) fn validate_key_component(component: &str) -> StorageResult<()> {
    if component.is_empty()
        || component.contains('/')
        || component.contains('\\')
        || component == "."
        || component == ".."
    {
        return Err(StorageError::invalid_key(format!(
            "Invalid key component: {component}"
        )));
    }
    Ok(())
}
