//! Version history engine for redline.
//!
//! This crate ties the diff engine and the snapshot store together:
//! - Snapshot capture with cached change summaries
//! - Safety-capture-then-restore (restore is never destructive)
//! - Timer-driven auto-save with no-op suppression
//! - Panic-button recovery and quick save/restore commands
//!
//! [`RecoveryCommands`] is the surface other code should call; nothing
//! outside this crate should touch the snapshot store or the diff engine
//! directly.
//!
//! # Example
//!
//! ```no_run
//! use redline_core::{
//!     BufferAccessor, ContentAccessor, HistoryConfig, RecoveryCommands, SnapshotManager,
//! };
//! use redline_storage::detect_store;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = HistoryConfig::default();
//! let store = detect_store(Some("/tmp/redline".into()), config.limits.clone()).await;
//! let content = Arc::new(BufferAccessor::new("")) as Arc<dyn ContentAccessor>;
//!
//! let manager = Arc::new(SnapshotManager::new("doc_1", store, content, config));
//! let commands = RecoveryCommands::new(Arc::clone(&manager));
//!
//! let report = commands.quick_save().await;
//! println!("{}", report.message());
//! # }
//! ```

pub mod bus;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod manager;
pub mod scheduler;

pub use bus::{Bus, HistoryEvent};
pub use commands::{RecoveryCommands, RecoveryReport};
pub use config::HistoryConfig;
pub use content::{BufferAccessor, ContentAccessor};
pub use error::{CoreError, CoreResult};
pub use manager::{CaptureOutcome, Comparison, SnapshotManager};
pub use scheduler::{AutoSaveScheduler, SchedulerState};

// Storage types that appear in this crate's public API.
pub use redline_storage::{Snapshot, SnapshotId, StorageUsage, StoreLimits};
