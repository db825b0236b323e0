//! Diagnostic log file setup.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::{AuthConfigFactoryConfig, FactoryConfigError};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    Config(#[from] FactoryConfigError),

    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log level '{level}': {reason}")]
    Filter { level: String, reason: String },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Install a global subscriber appending to the configured log file.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the background writer.
///
/// # Errors
///
/// Fails if the log location is unset, the file cannot be opened, the level
/// does not parse, or a subscriber is already installed.
pub fn init_file_logging(config: &AuthConfigFactoryConfig) -> Result<WorkerGuard, LoggingError> {
    let path = config.log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| LoggingError::Open {
            path: path.clone(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::Open {
            path: path.clone(),
            source,
        })?;

    let filter = EnvFilter::try_new(&config.log_level).map_err(|e| LoggingError::Filter {
        level: config.log_level.clone(),
        reason: e.to_string(),
    })?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    tracing::info!(path = %path.display(), "auth config logging initialized");
    Ok(guard)
}
