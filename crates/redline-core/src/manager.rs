//! Snapshot capture, comparison, and restore orchestration.
//!
//! The manager is the only component that calls the diff engine and the
//! snapshot store together. It owns the capture/restore protocol: every
//! snapshot is created here (manual save, auto-save tick, or pre-restore
//! safety capture) and nowhere else.

use crate::bus::{Bus, HistoryEvent};
use crate::config::HistoryConfig;
use crate::content::ContentAccessor;
use crate::error::{CoreError, CoreResult};
use redline_diff::{diff, DiffResult};
use redline_storage::{
    Snapshot, SnapshotId, SnapshotStore, StorageError, StorageUsage,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A snapshot was persisted.
    Created(Snapshot),
    /// Content was byte-identical to the latest snapshot; auto-saves
    /// never create redundant history. Not an error.
    Unchanged,
}

impl CaptureOutcome {
    /// The created snapshot, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            CaptureOutcome::Created(snapshot) => Some(snapshot),
            CaptureOutcome::Unchanged => None,
        }
    }
}

/// The result of comparing two snapshots.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Word-level diff from the old snapshot's content to the new one's.
    pub diff: DiffResult,
    /// Word count of the old snapshot.
    pub old_word_count: usize,
    /// Word count of the new snapshot.
    pub new_word_count: usize,
}

/// Orchestrates snapshot capture, retention, comparison, and restore for
/// one document.
pub struct SnapshotManager {
    document_id: String,
    store: Arc<dyn SnapshotStore>,
    content: Arc<dyn ContentAccessor>,
    bus: Bus,
    config: HistoryConfig,
}

impl SnapshotManager {
    /// Create a manager for a document.
    pub fn new(
        document_id: impl Into<String>,
        store: Arc<dyn SnapshotStore>,
        content: Arc<dyn ContentAccessor>,
        config: HistoryConfig,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            store,
            content,
            bus: Bus::new(),
            config,
        }
    }

    /// The document this manager is scoped to.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// The event bus for history notifications.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The engine configuration.
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Run a storage call under the configured deadline.
    async fn with_timeout<T, F>(&self, operation: F) -> CoreResult<T>
    where
        F: Future<Output = redline_storage::StorageResult<T>>,
    {
        match tokio::time::timeout(self.config.storage_timeout(), operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CoreError::Storage(StorageError::Timeout)),
        }
    }

    /// Capture the current content as a new snapshot.
    ///
    /// The changes summary is computed by diffing against the latest
    /// existing snapshot and cached on the record, so the timeline never
    /// recomputes it. The very first snapshot for a document is summarized
    /// as "Initial version". An auto-save whose content is byte-identical
    /// to the latest snapshot is suppressed ([`CaptureOutcome::Unchanged`]);
    /// a manual save is always honored.
    pub async fn create_snapshot(&self, is_manual: bool) -> CoreResult<CaptureOutcome> {
        let content = self.content.current_content().await?;
        let latest = self.latest_snapshot().await?;

        let changes_summary = match &latest {
            None => "Initial version".to_string(),
            Some(previous) => {
                if !is_manual && previous.content == content {
                    debug!(
                        document_id = %self.document_id,
                        "Content unchanged since last snapshot, skipping auto-save"
                    );
                    return Ok(CaptureOutcome::Unchanged);
                }
                let result = diff(&previous.content, &content);
                format!(
                    "+{} words, -{} words",
                    result.added_words, result.removed_words
                )
            }
        };

        let snapshot = Snapshot::new(&self.document_id, content, is_manual, changes_summary);
        self.with_timeout(self.store.save(&snapshot)).await?;

        info!(
            document_id = %self.document_id,
            snapshot_id = %snapshot.id,
            is_manual,
            word_count = snapshot.word_count,
            "Created snapshot"
        );
        self.bus.publish(HistoryEvent::SnapshotCreated {
            document_id: self.document_id.clone(),
            snapshot_id: snapshot.id.as_str().to_string(),
            is_manual,
        });

        Ok(CaptureOutcome::Created(snapshot))
    }

    /// The most recent snapshot, if any.
    pub async fn latest_snapshot(&self) -> CoreResult<Option<Snapshot>> {
        let snapshots = self.with_timeout(self.store.get_all(&self.document_id)).await?;
        Ok(snapshots.into_iter().max_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        }))
    }

    /// All snapshots for the document, newest first.
    pub async fn all_snapshots(&self) -> CoreResult<Vec<Snapshot>> {
        let mut snapshots = self.with_timeout(self.store.get_all(&self.document_id)).await?;
        snapshots.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.as_str().cmp(a.id.as_str()))
        });
        Ok(snapshots)
    }

    /// Fetch one snapshot, reporting a missing id as [`CoreError::NotFound`].
    pub async fn get_snapshot(&self, snapshot_id: &SnapshotId) -> CoreResult<Snapshot> {
        match self
            .with_timeout(self.store.get(&self.document_id, snapshot_id))
            .await
        {
            Err(CoreError::Storage(StorageError::NotFound(key))) => Err(CoreError::NotFound(key)),
            other => other,
        }
    }

    /// Word-level diff between two stored snapshots.
    pub async fn compare_snapshots(
        &self,
        old_id: &SnapshotId,
        new_id: &SnapshotId,
    ) -> CoreResult<Comparison> {
        let old = self.get_snapshot(old_id).await?;
        let new = self.get_snapshot(new_id).await?;

        Ok(Comparison {
            diff: diff(&old.content, &new.content),
            old_word_count: old.word_count,
            new_word_count: new.word_count,
        })
    }

    /// Replace live content with a stored snapshot's content.
    ///
    /// The state being overwritten is captured first as a manual snapshot;
    /// restore is never destructive. If that safety snapshot fails to
    /// persist, the restore aborts and current content is untouched.
    pub async fn restore_snapshot(&self, target_id: &SnapshotId) -> CoreResult<Snapshot> {
        let target = self.get_snapshot(target_id).await?;

        if let Err(e) = self.create_snapshot(true).await {
            warn!(
                document_id = %self.document_id,
                snapshot_id = %target_id,
                error = %e,
                "Safety snapshot failed, aborting restore"
            );
            return Err(CoreError::RestoreAborted(format!(
                "safety snapshot failed: {e}"
            )));
        }

        self.content.replace_content(&target.content).await?;

        info!(
            document_id = %self.document_id,
            snapshot_id = %target_id,
            "Restored snapshot"
        );
        self.bus.publish(HistoryEvent::SnapshotRestored {
            document_id: self.document_id.clone(),
            snapshot_id: target_id.as_str().to_string(),
        });

        Ok(target)
    }

    /// The `limit` most recent snapshots, manual and auto alike.
    ///
    /// This is the unconditional escape hatch behind the panic button: no
    /// filtering, newest first.
    pub async fn panic_snapshots(&self, limit: usize) -> CoreResult<Vec<Snapshot>> {
        let mut snapshots = self.all_snapshots().await?;
        snapshots.truncate(limit);
        info!(
            document_id = %self.document_id,
            count = snapshots.len(),
            "Panic recovery requested"
        );
        Ok(snapshots)
    }

    /// Delete one snapshot.
    pub async fn delete_snapshot(&self, snapshot_id: &SnapshotId) -> CoreResult<()> {
        match self
            .with_timeout(self.store.delete(&self.document_id, snapshot_id))
            .await
        {
            Err(CoreError::Storage(StorageError::NotFound(key))) => {
                return Err(CoreError::NotFound(key));
            }
            other => other?,
        }

        self.bus.publish(HistoryEvent::SnapshotDeleted {
            document_id: self.document_id.clone(),
            snapshot_id: Some(snapshot_id.as_str().to_string()),
        });
        Ok(())
    }

    /// Delete the document's entire history.
    pub async fn delete_all_snapshots(&self) -> CoreResult<()> {
        self.with_timeout(self.store.delete_all(&self.document_id))
            .await?;
        self.bus.publish(HistoryEvent::SnapshotDeleted {
            document_id: self.document_id.clone(),
            snapshot_id: None,
        });
        Ok(())
    }

    /// Aggregate storage usage, for quota UI.
    pub async fn usage(&self) -> CoreResult<StorageUsage> {
        self.with_timeout(self.store.usage()).await
    }
}
