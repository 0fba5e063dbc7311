//! Timer-driven auto-save scheduling.
//!
//! The scheduler is an explicit state machine with three states: stopped,
//! idle (timer armed), and capturing (a snapshot attempt in flight). At
//! most one capture is in flight at a time: a tick that fires while a
//! capture is still running is dropped, not queued. A failed capture is
//! logged and never kills future ticks.

use crate::manager::{CaptureOutcome, SnapshotManager};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No timer armed.
    Stopped,
    /// Timer armed, waiting for the next tick.
    Idle,
    /// A snapshot attempt is in flight.
    Capturing,
}

enum Command {
    SetInterval(Duration),
    Stop,
}

/// Periodic auto-save driver over a [`SnapshotManager`].
pub struct AutoSaveScheduler {
    manager: Arc<SnapshotManager>,
    state: Arc<Mutex<SchedulerState>>,
    commands: Option<mpsc::UnboundedSender<Command>>,
    task: Option<JoinHandle<()>>,
}

impl AutoSaveScheduler {
    /// Create a stopped scheduler.
    pub fn new(manager: Arc<SnapshotManager>) -> Self {
        Self {
            manager,
            state: Arc::new(Mutex::new(SchedulerState::Stopped)),
            commands: None,
            task: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a timer is armed.
    pub fn is_running(&self) -> bool {
        self.state() != SchedulerState::Stopped
    }

    /// Arm the recurring timer.
    ///
    /// If the scheduler is already running this just re-arms the timer
    /// with the new interval, preserving the idle/capturing distinction.
    pub fn start(&mut self, interval: Duration) {
        if self.commands.is_some() {
            self.set_interval(interval);
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        set_state(&self.state, SchedulerState::Idle);
        info!(interval_secs = interval.as_secs(), "Auto-save started");

        let state = Arc::clone(&self.state);
        let manager = Arc::clone(&self.manager);
        let task = tokio::spawn(async move {
            let mut ticker = make_ticker(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !transition(&state, SchedulerState::Idle, SchedulerState::Capturing) {
                            continue;
                        }
                        match manager.create_snapshot(false).await {
                            Ok(CaptureOutcome::Created(snapshot)) => {
                                debug!(snapshot_id = %snapshot.id, "Auto-save captured snapshot");
                            }
                            Ok(CaptureOutcome::Unchanged) => {
                                debug!("Auto-save skipped, content unchanged");
                            }
                            Err(e) => {
                                // The timer loop must survive storage failures.
                                warn!(error = %e, "Auto-save failed");
                            }
                        }
                        transition(&state, SchedulerState::Capturing, SchedulerState::Idle);
                    }
                    command = rx.recv() => match command {
                        Some(Command::SetInterval(interval)) => {
                            debug!(interval_secs = interval.as_secs(), "Auto-save interval changed");
                            ticker = make_ticker(interval);
                        }
                        Some(Command::Stop) | None => break,
                    }
                }
            }
            set_state(&state, SchedulerState::Stopped);
            info!("Auto-save stopped");
        });

        self.commands = Some(tx);
        self.task = Some(task);
    }

    /// Re-arm the timer with a new interval while running.
    pub fn set_interval(&self, interval: Duration) {
        if let Some(tx) = &self.commands {
            let _ = tx.send(Command::SetInterval(interval));
        }
    }

    /// Cancel future ticks and wait for the loop to wind down.
    ///
    /// A capture already in flight is not cancelled; it completes and
    /// reports its outcome before the scheduler stops.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.commands.take() {
            let _ = tx.send(Command::Stop);
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        set_state(&self.state, SchedulerState::Stopped);
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn make_ticker(period: Duration) -> time::Interval {
    // First tick fires one full period from now, not immediately.
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

fn set_state(state: &Mutex<SchedulerState>, next: SchedulerState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
}

/// Move `from` to `to` if the state currently is `from`.
fn transition(state: &Mutex<SchedulerState>, from: SchedulerState, to: SchedulerState) -> bool {
    let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
    if *guard == from {
        *guard = to;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryConfig;
    use crate::content::{BufferAccessor, ContentAccessor};
    use async_trait::async_trait;
    use redline_storage::{
        MemoryStore, Snapshot, SnapshotId, SnapshotStore, StorageResult, StorageUsage, StoreLimits,
    };

    fn setup(content: &str) -> (Arc<BufferAccessor>, Arc<SnapshotManager>) {
        setup_with_store(content, Arc::new(MemoryStore::new()))
    }

    fn setup_with_store(
        content: &str,
        store: Arc<dyn SnapshotStore>,
    ) -> (Arc<BufferAccessor>, Arc<SnapshotManager>) {
        let buffer = Arc::new(BufferAccessor::new(content));
        let manager = Arc::new(SnapshotManager::new(
            "doc_sched",
            store,
            Arc::clone(&buffer) as Arc<dyn ContentAccessor>,
            HistoryConfig::default(),
        ));
        (buffer, manager)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_captures_changed_content() {
        let (buffer, manager) = setup("baseline");
        manager.create_snapshot(true).await.unwrap();

        let mut scheduler = AutoSaveScheduler::new(Arc::clone(&manager));
        scheduler.start(Duration::from_secs(60));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        buffer.set("edited");
        time::sleep(Duration::from_secs(61)).await;

        let all = manager.all_snapshots().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(!all[0].is_manual_save);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_content_produces_no_snapshots() {
        let (_, manager) = setup("baseline");
        manager.create_snapshot(true).await.unwrap();

        let mut scheduler = AutoSaveScheduler::new(Arc::clone(&manager));
        scheduler.start(Duration::from_secs(60));

        // Three ticks with unchanged content.
        time::sleep(Duration::from_secs(185)).await;

        assert_eq!(manager.all_snapshots().await.unwrap().len(), 1);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_moves_to_stopped_and_cancels_ticks() {
        let (buffer, manager) = setup("baseline");
        manager.create_snapshot(true).await.unwrap();

        let mut scheduler = AutoSaveScheduler::new(Arc::clone(&manager));
        scheduler.start(Duration::from_secs(60));
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        buffer.set("edited after stop");
        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(manager.all_snapshots().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_rearms_timer() {
        let (buffer, manager) = setup("baseline");
        manager.create_snapshot(true).await.unwrap();

        let mut scheduler = AutoSaveScheduler::new(Arc::clone(&manager));
        scheduler.start(Duration::from_secs(600));
        scheduler.set_interval(Duration::from_secs(10));

        buffer.set("edited");
        time::sleep(Duration::from_secs(15)).await;

        assert_eq!(manager.all_snapshots().await.unwrap().len(), 2);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failure_does_not_kill_future_ticks() {
        // A one-snapshot quota makes every auto-save fail after the baseline.
        let store = Arc::new(MemoryStore::with_limits(StoreLimits {
            max_snapshots_per_document: Some(1),
            max_total_bytes: None,
        }));
        let (buffer, manager) = setup_with_store("baseline", store);
        manager.create_snapshot(true).await.unwrap();

        let mut scheduler = AutoSaveScheduler::new(Arc::clone(&manager));
        scheduler.start(Duration::from_secs(60));

        buffer.set("edit one");
        time::sleep(Duration::from_secs(61)).await;
        buffer.set("edit two");
        time::sleep(Duration::from_secs(60)).await;

        // Both ticks failed, but the scheduler is still armed.
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(manager.all_snapshots().await.unwrap().len(), 1);
        scheduler.stop().await;
    }

    /// Store wrapper whose saves take several seconds to land.
    struct SlowSaves {
        inner: MemoryStore,
    }

    #[async_trait]
    impl SnapshotStore for SlowSaves {
        async fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
            time::sleep(Duration::from_secs(5)).await;
            self.inner.save(snapshot).await
        }

        async fn get_all(&self, document_id: &str) -> StorageResult<Vec<Snapshot>> {
            self.inner.get_all(document_id).await
        }

        async fn get(
            &self,
            document_id: &str,
            snapshot_id: &SnapshotId,
        ) -> StorageResult<Snapshot> {
            self.inner.get(document_id, snapshot_id).await
        }

        async fn delete(
            &self,
            document_id: &str,
            snapshot_id: &SnapshotId,
        ) -> StorageResult<()> {
            self.inner.delete(document_id, snapshot_id).await
        }

        async fn delete_all(&self, document_id: &str) -> StorageResult<()> {
            self.inner.delete_all(document_id).await
        }

        async fn usage(&self) -> StorageResult<StorageUsage> {
            self.inner.usage().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_capture_completes_the_capture() {
        let store = Arc::new(SlowSaves {
            inner: MemoryStore::new(),
        });
        let (buffer, manager) = setup_with_store("baseline", store);
        manager.create_snapshot(true).await.unwrap();

        let mut scheduler = AutoSaveScheduler::new(Arc::clone(&manager));
        scheduler.start(Duration::from_secs(60));

        buffer.set("edited");
        // One second past the tick: the capture is mid-save.
        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(scheduler.state(), SchedulerState::Capturing);

        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        // The in-flight capture persisted before stop returned.
        assert_eq!(manager.all_snapshots().await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_rearms() {
        let (_, manager) = setup("baseline");
        let mut scheduler = AutoSaveScheduler::new(Arc::clone(&manager));
        scheduler.start(Duration::from_secs(60));
        scheduler.start(Duration::from_secs(120));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        scheduler.stop().await;
    }
}
