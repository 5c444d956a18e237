//! File logging.
//!
//! The terminal belongs to the TUI, so `tracing` output goes to
//! `$XDG_STATE_HOME/chatrev/chatrev.log` through a non-blocking writer. The
//! returned guard must live until shutdown or buffered lines are lost.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::xdg_dir;

/// Environment variable holding a filter directive that overrides the config.
pub const LOG_ENV: &str = "CHATREV_LOG";

pub fn log_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state").join("chatrev")
}

/// Installs the global subscriber. `default_level` comes from the config.
pub fn init(default_level: &str) -> anyhow::Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, "chatrev.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(guard)
}
