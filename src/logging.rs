// src/logging.rs

//! Logging setup for `runmon` using `tracing` + `tracing-subscriber`.
//!
//! The level comes from the `RUNMON_LOG` environment variable
//! (`off`, `error`, `warn`, `info`, `debug`, `trace`) and defaults to `warn`.
//!
//! Logs are sent to STDERR. Stdout carries the echoed master output and
//! whatever the dependent tasks print, so nothing else may be written there.

use anyhow::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;

/// Environment variable consulted for the log level.
pub const LOG_ENV: &str = "RUNMON_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging() -> Result<()> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| level_from_env(&s))
        .unwrap_or(LevelFilter::WARN);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// `off` silences runmon's own diagnostics entirely; unknown values fall
/// back to the default.
fn level_from_env(s: &str) -> Option<LevelFilter> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}
