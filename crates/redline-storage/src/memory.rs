//! In-memory storage backend.
//!
//! The small-capacity fallback used when no writable directory is
//! available, and the default backend in tests. Data does not survive the
//! process.

use crate::{
    validate_key_component, Snapshot, SnapshotId, SnapshotStore, StorageError, StorageResult,
    StoreLimits, StorageUsage,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Default byte cap when no explicit limit is configured.
///
/// The in-memory backend is the small-capacity fallback; an unbounded
/// default would let a runaway auto-save loop eat the host's memory.
const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// In-memory snapshot storage.
pub struct MemoryStore {
    /// document_id -> snapshot_id -> serialized snapshot.
    data: RwLock<HashMap<String, HashMap<String, String>>>,
    limits: StoreLimits,
}

impl MemoryStore {
    /// Create a store with the default capacity cap.
    pub fn new() -> Self {
        Self::with_limits(StoreLimits::default())
    }

    /// Create a store with explicit limits.
    ///
    /// An unset byte limit still gets the built-in default cap.
    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            limits,
        }
    }

    fn byte_cap(&self) -> u64 {
        self.limits.max_total_bytes.unwrap_or(DEFAULT_MAX_BYTES)
    }

    fn total_bytes(data: &HashMap<String, HashMap<String, String>>) -> u64 {
        data.values()
            .flat_map(|docs| docs.values())
            .map(|json| json.len() as u64)
            .sum()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        validate_key_component(&snapshot.document_id)?;
        validate_key_component(snapshot.id.as_str())?;

        let json = serde_json::to_string(snapshot)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let document = data.get(&snapshot.document_id);
        let replacing = document.and_then(|d| d.get(snapshot.id.as_str()));

        if let Some(max) = self.limits.max_snapshots_per_document {
            let count = document.map_or(0, |d| d.len());
            if replacing.is_none() && count as u32 >= max {
                return Err(StorageError::quota_exceeded(format!(
                    "{count} of {max} snapshots used for {}",
                    snapshot.document_id
                )));
            }
        }

        let replaced_bytes = replacing.map_or(0, |json| json.len() as u64);
        let new_total = Self::total_bytes(&data) - replaced_bytes + json.len() as u64;
        if new_total > self.byte_cap() {
            return Err(StorageError::quota_exceeded(format!(
                "{new_total} bytes would exceed the {} byte cap",
                self.byte_cap()
            )));
        }

        data.entry(snapshot.document_id.clone())
            .or_default()
            .insert(snapshot.id.as_str().to_string(), json);

        debug!(
            document_id = %snapshot.document_id,
            snapshot_id = %snapshot.id,
            "Saved snapshot to memory store"
        );

        Ok(())
    }

    async fn get_all(&self, document_id: &str) -> StorageResult<Vec<Snapshot>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let mut snapshots = Vec::new();
        if let Some(document) = data.get(document_id) {
            for json in document.values() {
                snapshots.push(serde_json::from_str(json)?);
            }
        }
        Ok(snapshots)
    }

    async fn get(&self, document_id: &str, snapshot_id: &SnapshotId) -> StorageResult<Snapshot> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let json = data
            .get(document_id)
            .and_then(|document| document.get(snapshot_id.as_str()))
            .ok_or_else(|| StorageError::not_found(document_id, snapshot_id.as_str()))?;

        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.document_id != document_id {
            return Err(StorageError::not_found(document_id, snapshot_id.as_str()));
        }
        Ok(snapshot)
    }

    async fn delete(&self, document_id: &str, snapshot_id: &SnapshotId) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let removed = data
            .get_mut(document_id)
            .and_then(|document| document.remove(snapshot_id.as_str()));

        if removed.is_none() {
            return Err(StorageError::not_found(document_id, snapshot_id.as_str()));
        }
        Ok(())
    }

    async fn delete_all(&self, document_id: &str) -> StorageResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        data.remove(document_id);
        Ok(())
    }

    async fn usage(&self) -> StorageResult<StorageUsage> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;

        let document_count = data.values().filter(|d| !d.is_empty()).count();
        let snapshot_count = data.values().map(|d| d.len()).sum();
        let approximate_bytes = Self::total_bytes(&data);

        Ok(StorageUsage {
            snapshot_count,
            approximate_bytes,
            document_count,
        })
    }
}
