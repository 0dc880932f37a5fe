//! Logging
//!
//! File-only tracing, enabled by `--debug`. Nothing is written to the terminal
//! because the TUI owns it.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "weekgoals.log";
const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug_mode: bool,
    pub log_dir: PathBuf,
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            log_dir: log_dir(),
            default_level: "debug".to_string(),
        }
    }

    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = dir;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Default log directory: `<data dir>/weekgoals/logs`
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("weekgoals")
        .join("logs")
}

/// Install the global subscriber. Returns the appender guard, which must be
/// held until exit so buffered lines get flushed. No-op without debug mode.
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>> {
    if !config.debug_mode {
        return Ok(None);
    }

    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("WEEKGOALS_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        "weekgoals {} logging to {:?}",
        env!("CARGO_PKG_VERSION"),
        config.log_dir
    );
    Ok(Some(guard))
}

fn is_log_file(path: &std::path::Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
}

/// Log files in `dir`, oldest first.
pub fn list_log_files_in(dir: &std::path::Path) -> Result<Vec<(PathBuf, SystemTime)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if !is_log_file(&path) {
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        files.push((path, modified));
    }
    files.sort_by_key(|(_, modified)| *modified);
    Ok(files)
}

/// Remove log files older than `days` from `dir`; returns how many went.
pub fn cleanup_logs_in(dir: &std::path::Path, days: u64) -> Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(days.saturating_mul(SECS_PER_DAY)))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut removed = 0;
    for (path, modified) in list_log_files_in(dir)? {
        if modified < cutoff {
            fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn cleanup_old_logs(days: u64) -> Result<usize> {
    let dir = std::env::var("WEEKGOALS_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| log_dir());
    cleanup_logs_in(&dir, days)
}
