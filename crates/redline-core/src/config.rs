//! Engine configuration.

use redline_storage::StoreLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the version history engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Auto-save interval in minutes.
    pub auto_save_interval_minutes: u64,

    /// How many snapshots the panic button returns.
    pub panic_limit: usize,

    /// Deadline for each storage call, in seconds. A call that runs past
    /// it fails with a timeout instead of blocking the caller.
    pub storage_timeout_secs: u64,

    /// Capacity limits enforced at the store boundary.
    pub limits: StoreLimits,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            auto_save_interval_minutes: 5,
            panic_limit: 10,
            storage_timeout_secs: 10,
            limits: StoreLimits::default(),
        }
    }
}

impl HistoryConfig {
    /// The auto-save interval as a [`Duration`].
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_minutes * 60)
    }

    /// The storage deadline as a [`Duration`].
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HistoryConfig::default();
        assert_eq!(config.auto_save_interval(), Duration::from_secs(300));
        assert_eq!(config.panic_limit, 10);
        assert_eq!(config.storage_timeout(), Duration::from_secs(10));
        assert!(config.limits.max_snapshots_per_document.is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = HistoryConfig {
            auto_save_interval_minutes: 1,
            panic_limit: 3,
            storage_timeout_secs: 2,
            limits: StoreLimits {
                max_snapshots_per_document: Some(50),
                max_total_bytes: Some(1024),
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: HistoryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.panic_limit, 3);
        assert_eq!(parsed.limits.max_snapshots_per_document, Some(50));
    }
}
