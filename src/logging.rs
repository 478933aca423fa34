// src/logging.rs

//! Logging setup for `plugdag` using `tracing` + `tracing-subscriber`.
//!
//! The library itself only emits `tracing` events; nothing here runs unless
//! the embedding program asks for it.
//!
//! Priority for determining the log level:
//! 1. the level passed by the caller (e.g. from `[engine].log_level`)
//! 2. `PLUGDAG_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR.

use anyhow::{Result, anyhow};
use tracing_subscriber::fmt;

use crate::types::LogLevel;

/// Initialise the global logging subscriber.
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let level = match level {
        Some(lvl) => lvl.into(),
        None => std::env::var("PLUGDAG_LOG")
            .ok()
            .and_then(|s| s.parse::<LogLevel>().ok())
            .map(tracing::Level::from)
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
