//! Event fan-out for history notifications.
//!
//! The engine emits "snapshot created", "snapshot restored", and
//! "snapshot deleted" notifications for UI and telemetry layers to
//! subscribe to. The bus is an explicit subscriber list owned by the
//! snapshot manager, with no dependency on any particular transport:
//! subscribers receive typed events over a tokio broadcast channel.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Default channel capacity.
const DEFAULT_CAPACITY: usize = 64;

/// A history notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    /// A snapshot was persisted.
    SnapshotCreated {
        document_id: String,
        snapshot_id: String,
        is_manual: bool,
    },
    /// Live content was replaced from a snapshot.
    SnapshotRestored {
        document_id: String,
        snapshot_id: String,
    },
    /// A snapshot (or a whole document's history) was deleted.
    SnapshotDeleted {
        document_id: String,
        snapshot_id: Option<String>,
    },
}

impl HistoryEvent {
    /// Event type name for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            HistoryEvent::SnapshotCreated { .. } => "snapshot.created",
            HistoryEvent::SnapshotRestored { .. } => "snapshot.restored",
            HistoryEvent::SnapshotDeleted { .. } => "snapshot.deleted",
        }
    }
}

/// Broadcast bus for history events.
#[derive(Clone)]
pub struct Bus {
    tx: broadcast::Sender<HistoryEvent>,
}

impl Bus {
    /// Create a new bus.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all subscribers.
    ///
    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: HistoryEvent) {
        debug!(event_type = event.event_type(), "Publishing event");
        let _ = self.tx.send(event);
    }

    /// Subscribe to history events.
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
