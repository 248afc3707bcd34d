//! Structured Logger
//!
//! Wraps `tracing` to provide JSON-formatted output, file rotation (NDJSON),
//! and environment-based level control.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "govsync.log";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    // Writes NDJSON to `<log_dir>/govsync.log.YYYY-MM-DD`
    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX))
}

/// Initialize the global structured logger.
/// Creates a console logger and a rolling file logger.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) -> Result<()> {
    let appender = file_appender(log_dir.as_ref())?;

    let file_layer = fmt::layer().json().with_writer(appender).with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(console_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

/// Initialize a file-only logger.
///
/// Used while the terminal UI owns the screen; console output would corrupt
/// the alternate screen buffer.
pub fn init_file_logger<P: AsRef<Path>>(log_dir: P, level: &str) -> Result<()> {
    let appender = file_appender(log_dir.as_ref())?;

    let file_layer = fmt::layer().json().with_writer(appender).with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(file_layer)
        .try_init();
    Ok(())
}
