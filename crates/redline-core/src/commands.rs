//! Recovery commands: the public entry points for user-triggered actions.
//!
//! Thin orchestration over the snapshot manager. Every command resolves to
//! a [`RecoveryReport`]: success, a named no-op, or a recoverable failure
//! with a suggestion. Raw lower-layer errors never reach the user.

use crate::error::CoreError;
use crate::manager::{CaptureOutcome, SnapshotManager};
use redline_storage::{Snapshot, StorageError};
use std::sync::Arc;

/// User-facing outcome of a recovery command.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryReport {
    /// A snapshot was saved.
    Saved { snapshot: Snapshot },
    /// Nothing changed since the last snapshot; nothing was saved.
    NoChanges,
    /// The panic button found recent snapshots, newest first.
    Recovered { snapshots: Vec<Snapshot> },
    /// No snapshots exist yet.
    NothingToRecover,
    /// Quick restore needs explicit confirmation before touching content.
    ConfirmationRequired { snapshot: Snapshot },
    /// Content was replaced from the given snapshot.
    Restored { snapshot: Snapshot },
    /// One-line summary of the two most recent snapshots.
    Compared { summary: String },
    /// Fewer than two snapshots exist; there is nothing to compare.
    NothingToCompare,
    /// A recoverable failure, with a suggestion for the user.
    Failed { message: String, suggestion: String },
}

impl RecoveryReport {
    /// A one-line human-readable message for toasts and status bars.
    pub fn message(&self) -> String {
        match self {
            RecoveryReport::Saved { snapshot } => {
                format!("Snapshot saved ({})", snapshot.changes_summary)
            }
            RecoveryReport::NoChanges => "No changes since last snapshot".to_string(),
            RecoveryReport::Recovered { snapshots } => {
                format!("Found {} recent snapshots", snapshots.len())
            }
            RecoveryReport::NothingToRecover => "Nothing to recover yet".to_string(),
            RecoveryReport::ConfirmationRequired { snapshot } => format!(
                "Restore snapshot from {}? This will replace the current content.",
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S")
            ),
            RecoveryReport::Restored { snapshot } => format!(
                "Restored snapshot from {}",
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S")
            ),
            RecoveryReport::Compared { summary } => summary.clone(),
            RecoveryReport::NothingToCompare => {
                "Need at least two snapshots to compare".to_string()
            }
            RecoveryReport::Failed {
                message,
                suggestion,
            } => format!("{message} ({suggestion})"),
        }
    }
}

/// The panic-button and quick-save/restore entry points.
///
/// Nothing outside this module and the manager should touch the snapshot
/// store or the diff engine directly.
pub struct RecoveryCommands {
    manager: Arc<SnapshotManager>,
}

impl RecoveryCommands {
    pub fn new(manager: Arc<SnapshotManager>) -> Self {
        Self { manager }
    }

    /// Panic button: the most recent snapshots, manual and auto alike.
    ///
    /// Uses the configured panic limit. Zero snapshots is "nothing to
    /// recover", not an error.
    pub async fn panic(&self) -> RecoveryReport {
        let limit = self.manager.config().panic_limit;
        match self.manager.panic_snapshots(limit).await {
            Ok(snapshots) if snapshots.is_empty() => RecoveryReport::NothingToRecover,
            Ok(snapshots) => RecoveryReport::Recovered { snapshots },
            Err(e) => failure("Panic recovery failed", &e),
        }
    }

    /// Save a manual snapshot of the current content.
    pub async fn quick_save(&self) -> RecoveryReport {
        match self.manager.create_snapshot(true).await {
            Ok(CaptureOutcome::Created(snapshot)) => RecoveryReport::Saved { snapshot },
            Ok(CaptureOutcome::Unchanged) => RecoveryReport::NoChanges,
            Err(e) => failure("Quick save failed", &e),
        }
    }

    /// Restore the single latest snapshot.
    ///
    /// Without `confirmed` this only reports what would be restored;
    /// content is never replaced silently.
    pub async fn quick_restore(&self, confirmed: bool) -> RecoveryReport {
        let latest = match self.manager.latest_snapshot().await {
            Ok(latest) => latest,
            Err(e) => return failure("Quick restore failed", &e),
        };
        let Some(latest) = latest else {
            return RecoveryReport::NothingToRecover;
        };

        if !confirmed {
            return RecoveryReport::ConfirmationRequired { snapshot: latest };
        }

        match self.manager.restore_snapshot(&latest.id).await {
            Ok(snapshot) => RecoveryReport::Restored { snapshot },
            Err(e) => failure("Quick restore failed", &e),
        }
    }

    /// Diff the two most recent snapshots and report a one-line summary.
    pub async fn compare_last(&self) -> RecoveryReport {
        let snapshots = match self.manager.all_snapshots().await {
            Ok(snapshots) => snapshots,
            Err(e) => return failure("Compare failed", &e),
        };
        if snapshots.len() < 2 {
            return RecoveryReport::NothingToCompare;
        }

        // all_snapshots is newest first: diff the older into the newer.
        match self
            .manager
            .compare_snapshots(&snapshots[1].id, &snapshots[0].id)
            .await
        {
            Ok(comparison) => RecoveryReport::Compared {
                summary: format!(
                    "+{} words, -{} words",
                    comparison.diff.added_words, comparison.diff.removed_words
                ),
            },
            Err(e) => failure("Compare failed", &e),
        }
    }
}

fn failure(message: &str, error: &CoreError) -> RecoveryReport {
    let suggestion = match error {
        CoreError::Storage(StorageError::QuotaExceeded(_)) => {
            "delete old snapshots or raise the storage cap"
        }
        CoreError::Storage(StorageError::Timeout) => "try again",
        CoreError::Storage(_) => "check storage space and try again",
        CoreError::NotFound(_) => "refresh the timeline and try again",
        CoreError::RestoreAborted(_) => "your content was not modified, try again",
        CoreError::Content(_) => "make sure the editor is ready and try again",
    };
    RecoveryReport::Failed {
        message: format!("{message}: {error}"),
        suggestion: suggestion.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryConfig;
    use crate::content::{BufferAccessor, ContentAccessor};
    use redline_storage::{MemoryStore, StoreLimits};

    fn setup(content: &str) -> (Arc<BufferAccessor>, RecoveryCommands) {
        setup_with_config(content, HistoryConfig::default())
    }

    fn setup_with_config(
        content: &str,
        config: HistoryConfig,
    ) -> (Arc<BufferAccessor>, RecoveryCommands) {
        let buffer = Arc::new(BufferAccessor::new(content));
        let store = Arc::new(MemoryStore::with_limits(config.limits.clone()));
        let manager = Arc::new(SnapshotManager::new(
            "doc_cmd",
            store,
            Arc::clone(&buffer) as Arc<dyn ContentAccessor>,
            config,
        ));
        (buffer, RecoveryCommands::new(manager))
    }

    #[tokio::test]
    async fn test_quick_save_reports_saved() {
        let (_, commands) = setup("draft one");
        let report = commands.quick_save().await;
        assert!(matches!(report, RecoveryReport::Saved { .. }));
        assert!(report.message().contains("Initial version"));
    }

    #[tokio::test]
    async fn test_panic_with_no_snapshots() {
        let (_, commands) = setup("anything");
        assert_eq!(commands.panic().await, RecoveryReport::NothingToRecover);
    }

    #[tokio::test]
    async fn test_panic_returns_recent_snapshots() {
        let (buffer, commands) = setup("v1");
        commands.quick_save().await;
        buffer.set("v2");
        commands.quick_save().await;

        match commands.panic().await {
            RecoveryReport::Recovered { snapshots } => {
                assert_eq!(snapshots.len(), 2);
                assert_eq!(snapshots[0].content, "v2");
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panic_respects_configured_limit() {
        let config = HistoryConfig {
            panic_limit: 2,
            ..HistoryConfig::default()
        };
        let (buffer, commands) = setup_with_config("v1", config);
        for version in ["v1", "v2", "v3", "v4"] {
            buffer.set(version);
            commands.quick_save().await;
        }

        match commands.panic().await {
            RecoveryReport::Recovered { snapshots } => assert_eq!(snapshots.len(), 2),
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_quick_restore_requires_confirmation() {
        let (buffer, commands) = setup("original");
        commands.quick_save().await;
        buffer.set("edited");

        let report = commands.quick_restore(false).await;
        assert!(matches!(report, RecoveryReport::ConfirmationRequired { .. }));
        // Content untouched without confirmation.
        assert_eq!(buffer.get(), "edited");
    }

    #[tokio::test]
    async fn test_quick_restore_confirmed_replaces_content() {
        let (buffer, commands) = setup("original");
        commands.quick_save().await;
        buffer.set("edited");

        let report = commands.quick_restore(true).await;
        assert!(matches!(report, RecoveryReport::Restored { .. }));
        assert_eq!(buffer.get(), "original");
    }

    #[tokio::test]
    async fn test_quick_restore_with_no_snapshots() {
        let (_, commands) = setup("anything");
        assert_eq!(
            commands.quick_restore(true).await,
            RecoveryReport::NothingToRecover
        );
    }

    #[tokio::test]
    async fn test_compare_last_needs_two_snapshots() {
        let (_, commands) = setup("only one");
        commands.quick_save().await;
        assert_eq!(commands.compare_last().await, RecoveryReport::NothingToCompare);
    }

    #[tokio::test]
    async fn test_compare_last_summarizes_word_delta() {
        let (buffer, commands) = setup("one two");
        commands.quick_save().await;
        buffer.set("one two three four");
        commands.quick_save().await;

        match commands.compare_last().await {
            RecoveryReport::Compared { summary } => {
                assert_eq!(summary, "+2 words, -0 words");
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_carries_suggestion_not_raw_error() {
        let config = HistoryConfig {
            limits: StoreLimits {
                max_snapshots_per_document: Some(1),
                max_total_bytes: None,
            },
            ..HistoryConfig::default()
        };
        let (buffer, commands) = setup_with_config("v1", config);
        commands.quick_save().await;
        buffer.set("v2");

        match commands.quick_save().await {
            RecoveryReport::Failed {
                message,
                suggestion,
            } => {
                assert!(message.starts_with("Quick save failed"));
                assert!(suggestion.contains("delete old snapshots"));
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }
}
