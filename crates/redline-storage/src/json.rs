//! JSON file-based storage backend.
//!
//! The larger-capacity backend. Each snapshot is stored as one JSON file:
//! `<base>/<document_id>/<snapshot_id>.json`.

use crate::{
    validate_key_component, Snapshot, SnapshotId, SnapshotStore, StorageError, StorageResult,
    StorageUsage, StoreLimits,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// JSON file-based snapshot storage.
#[derive(Clone)]
pub struct JsonStore {
    base_path: PathBuf,
    limits: StoreLimits,
}

impl JsonStore {
    /// Create a new JSON store at the given base path.
    ///
    /// The directory is created lazily on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_limits(base_path, StoreLimits::default())
    }

    /// Create a new JSON store with explicit limits.
    pub fn with_limits(base_path: impl Into<PathBuf>, limits: StoreLimits) -> Self {
        Self {
            base_path: base_path.into(),
            limits,
        }
    }

    /// Verify the base directory is usable: create it and round-trip a
    /// probe file. Used by backend detection.
    pub async fn probe(base_path: impl Into<PathBuf>, limits: StoreLimits) -> StorageResult<Self> {
        let store = Self::with_limits(base_path, limits);
        fs::create_dir_all(&store.base_path).await?;

        let probe_path = store.base_path.join(".probe");
        fs::write(&probe_path, b"probe").await?;
        fs::remove_file(&probe_path).await?;

        Ok(store)
    }

    fn document_dir(&self, document_id: &str) -> PathBuf {
        self.base_path.join(document_id)
    }

    fn snapshot_path(
        &self,
        document_id: &str,
        snapshot_id: &SnapshotId,
    ) -> StorageResult<PathBuf> {
        validate_key_component(document_id)?;
        validate_key_component(snapshot_id.as_str())?;
        // Append rather than set_extension: an id containing a dot must not
        // have its tail rewritten into the extension.
        let file_name = format!("{}.json", snapshot_id.as_str());
        Ok(self.document_dir(document_id).join(file_name))
    }

    async fn enforce_limits(&self, snapshot: &Snapshot, path: &Path) -> StorageResult<()> {
        let replacing = path.exists();

        if let Some(max) = self.limits.max_snapshots_per_document {
            if !replacing {
                let count = self.get_all(&snapshot.document_id).await?.len();
                if count as u32 >= max {
                    return Err(StorageError::quota_exceeded(format!(
                        "{count} of {max} snapshots used for {}",
                        snapshot.document_id
                    )));
                }
            }
        }

        if let Some(max_bytes) = self.limits.max_total_bytes {
            let usage = self.usage().await?;
            if usage.approximate_bytes + snapshot.approximate_size() > max_bytes {
                return Err(StorageError::quota_exceeded(format!(
                    "store is {} of {max_bytes} bytes",
                    usage.approximate_bytes
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonStore {
    async fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let path = self.snapshot_path(&snapshot.document_id, &snapshot.id)?;
        self.enforce_limits(snapshot, &path).await?;

        debug!(path = %path.display(), "Writing snapshot");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(snapshot)?;

        // Write atomically (write to temp file, then rename)
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    async fn get_all(&self, document_id: &str) -> StorageResult<Vec<Snapshot>> {
        validate_key_component(document_id)?;
        let dir = self.document_dir(document_id);
        let mut snapshots = Vec::new();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(snapshots),
            Err(e) => return Err(StorageError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            match serde_json::from_str::<Snapshot>(&content) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable snapshot"),
            }
        }

        Ok(snapshots)
    }

    async fn get(&self, document_id: &str, snapshot_id: &SnapshotId) -> StorageResult<Snapshot> {
        let path = self.snapshot_path(document_id, snapshot_id)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::not_found(document_id, snapshot_id.as_str()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        let snapshot: Snapshot = serde_json::from_str(&content)?;
        if snapshot.document_id != document_id || snapshot.id != *snapshot_id {
            return Err(StorageError::not_found(document_id, snapshot_id.as_str()));
        }
        Ok(snapshot)
    }

    async fn delete(&self, document_id: &str, snapshot_id: &SnapshotId) -> StorageResult<()> {
        let path = self.snapshot_path(document_id, snapshot_id)?;
        debug!(path = %path.display(), "Deleting snapshot");

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(document_id, snapshot_id.as_str()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn delete_all(&self, document_id: &str) -> StorageResult<()> {
        validate_key_component(document_id)?;
        let dir = self.document_dir(document_id);

        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn usage(&self) -> StorageResult<StorageUsage> {
        let mut usage = StorageUsage::default();

        let mut documents = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(usage),
            Err(e) => return Err(StorageError::Io(e)),
        };

        while let Some(document) = documents.next_entry().await? {
            if !document.file_type().await?.is_dir() {
                continue;
            }

            let mut snapshots_in_document = 0;
            let mut entries = fs::read_dir(document.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    snapshots_in_document += 1;
                    usage.approximate_bytes += entry.metadata().await?.len();
                }
            }

            if snapshots_in_document > 0 {
                usage.document_count += 1;
                usage.snapshot_count += snapshots_in_document;
            }
        }

        Ok(usage)
    }
}
