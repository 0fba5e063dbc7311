//! Logging setup using tracing.
//!
//! The engine is embedded in a host editor, so nothing is printed by
//! default: the host opts in to stderr output, a log file, or both.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging configuration.
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "redline_core=debug".
    ///
    /// `RUST_LOG` takes precedence when set.
    pub filter: String,
    /// Whether to print logs to stderr.
    pub stderr: bool,
    /// Log file to append to, if any.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            stderr: false,
            file: None,
        }
    }
}

/// Initialize logging with the given configuration.
///
/// Called once by the embedding host at startup. Returns an error string
/// rather than panicking when the log file cannot be opened, since logging
/// failure must never take the engine down with it.
pub fn init(config: LogConfig) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.as_str()));

    let stderr_layer = config.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    let file_layer = match &config.file {
        None => None,
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| e.to_string())?;
            Some(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Get the default log file path.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("redline").join("logs").join("redline.log"))
}
