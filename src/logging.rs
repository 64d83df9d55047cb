//! Diagnostic logging to a file.
//!
//! The terminal belongs to the interface, so logs are only written when a log
//! file is configured (`--log-file` or `debug.log_file`).

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::DebugConfig;

/// The command-line path wins over the configured one.
pub fn log_target(debug: &DebugConfig, cli_path: Option<&Path>) -> Option<PathBuf> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| debug.log_file.clone())
}

/// `RUST_LOG` when set and valid, otherwise the configured level for this crate.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tallyplot={}", level.to_lowercase())))
}

/// Install the global subscriber. Returns the log file in use, if any.
pub fn init(debug: &DebugConfig, cli_path: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(path) = log_target(debug, cli_path) else {
        return Ok(None);
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&debug.log_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {}", e))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Ok(Some(path))
}
