//! Backend capability detection.
//!
//! Prefers the larger-capacity JSON file backend when a writable
//! directory is available, falling back to the in-memory backend
//! otherwise. Callers depend only on the [`SnapshotStore`] trait.

use crate::{JsonStore, MemoryStore, SnapshotStore, StoreLimits};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Select a storage backend for the given preferred directory.
///
/// Probes the directory (create it, round-trip a small file); if the
/// probe fails, or no directory is given, the in-memory backend with its
/// conservative capacity cap is used instead.
pub async fn detect_store(
    preferred_dir: Option<PathBuf>,
    limits: StoreLimits,
) -> Arc<dyn SnapshotStore> {
    if let Some(dir) = preferred_dir {
        match JsonStore::probe(dir.clone(), limits.clone()).await {
            Ok(store) => {
                info!(path = %dir.display(), "Using JSON snapshot store");
                return Arc::new(store);
            }
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "JSON store unavailable, falling back to memory");
            }
        }
    } else {
        info!("No storage directory configured, using memory snapshot store");
    }

    Arc::new(MemoryStore::with_limits(limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Snapshot;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_detect_prefers_json_store() {
        let dir = tempdir().unwrap();
        let store = detect_store(
            Some(dir.path().join("snapshots")),
            StoreLimits::default(),
        )
        .await;

        let snapshot = Snapshot::new("doc_1", "content", false, "");
        store.save(&snapshot).await.unwrap();

        // Persisted on disk, not just in memory.
        assert!(dir.path().join("snapshots").join("doc_1").exists());
    }

    #[tokio::test]
    async fn test_detect_falls_back_to_memory() {
        let store = detect_store(None, StoreLimits::default()).await;

        let snapshot = Snapshot::new("doc_1", "content", false, "");
        store.save(&snapshot).await.unwrap();
        assert_eq!(store.get_all("doc_1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_detect_falls_back_on_unwritable_dir() {
        let dir = tempdir().unwrap();
        // A file where the store directory should be makes the probe fail.
        let blocked = dir.path().join("blocked");
        tokio::fs::write(&blocked, "file, not a directory")
            .await
            .unwrap();

        let store = detect_store(Some(blocked.clone()), StoreLimits::default()).await;

        // Still usable: the memory fallback accepted the save.
        let snapshot = Snapshot::new("doc_1", "content", false, "");
        store.save(&snapshot).await.unwrap();
        assert!(blocked.is_file());
    }
}
