use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_NAME: &str = "artwork-table.log";

/// Install a JSON file logger with daily rotation. The terminal is owned by
/// the TUI, so nothing is written to stdout or stderr. `RUST_LOG` wins over
/// `default_filter`. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init_logging(directory: &Path, default_filter: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(directory)
        .with_context(|| format!("failed to create log directory {}", directory.display()))?;

    let file_appender = tracing_appender::rolling::daily(directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(writer))
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(guard)
}
