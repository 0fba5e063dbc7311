//! Snapshot data structures.

use chrono::{DateTime, Utc};
use redline_util::id::{IdPrefix, Identifier};
use serde::{Deserialize, Serialize};

/// Unique identifier for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub String);

impl SnapshotId {
    /// Create a new snapshot ID (`snp_<ulid>`, ascending).
    pub fn new() -> Self {
        Self(Identifier::snapshot())
    }

    /// Create a snapshot ID from a string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID carries the snapshot prefix.
    pub fn is_well_formed(&self) -> bool {
        Identifier::has_prefix(&self.0, IdPrefix::Snapshot)
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable, timestamped capture of full document content.
///
/// The content is the full text at capture time, never a delta. Deltas are
/// computed on demand by the diff engine and never stored. Snapshots are
/// append-only: once created, `content` is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique identifier for this snapshot.
    pub id: SnapshotId,

    /// Identifies the owning document; all queries are scoped to it.
    pub document_id: String,

    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Full captured document content.
    pub content: String,

    /// Word count of `content`, computed at capture.
    pub word_count: usize,

    /// Whether this was an explicit user save (vs a scheduled auto-save).
    pub is_manual_save: bool,

    /// Short human-readable summary of changes against the preceding
    /// snapshot, cached at capture time (e.g. "+42 words, -3 words").
    pub changes_summary: String,
}

impl Snapshot {
    /// Create a new snapshot of the given content.
    pub fn new(
        document_id: impl Into<String>,
        content: impl Into<String>,
        is_manual_save: bool,
        changes_summary: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        Self {
            id: SnapshotId::new(),
            document_id: document_id.into(),
            timestamp: Utc::now(),
            content,
            word_count,
            is_manual_save,
            changes_summary: changes_summary.into(),
        }
    }

    /// Approximate serialized size in bytes, used for quota accounting.
    pub fn approximate_size(&self) -> u64 {
        (self.content.len()
            + self.changes_summary.len()
            + self.document_id.len()
            + self.id.as_str().len()
            + 64) as u64
    }
}
