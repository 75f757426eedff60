//! Structured logging.
//!
//! One process-wide subscriber with two sinks:
//! - rolling file (daily), `logging.file_level` and above (default WARN)
//! - console, `logging.console_level` and above (default INFO), `RUST_LOG` wins
//!
//! Installed once before serving. The returned [`LogGuard`] owns the
//! background file writer; dropping it flushes pending lines.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_SUFFIX: &str = "log";

/// Error type for logger installation.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("failed to create log directory {}: {source}", path.display())]
    Directory { path: PathBuf, source: io::Error },

    #[error("failed to create rolling file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("a global logger is already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Handle to the installed logger. Keep it alive until shutdown.
#[must_use = "dropping the guard stops the file writer"]
#[derive(Debug)]
pub struct LogGuard {
    file: Option<WorkerGuard>,
}

impl LogGuard {
    /// Flush buffered file output and release the writer.
    pub fn shutdown(mut self) {
        tracing::info!("Logging system shutting down, flushing buffers");
        self.file.take();
    }
}

/// Build the two-sink subscriber without installing it.
///
/// Returns the subscriber and the guard for the file writer.
pub fn build_subscriber(
    config: &LoggingConfig,
) -> Result<(impl Subscriber + Send + Sync + 'static, WorkerGuard), LoggingError> {
    let file_level = parse_level(&config.file_level)?;
    let console_level = parse_level(&config.console_level)?;

    let directory = PathBuf::from(&config.directory);
    fs::create_dir_all(&directory).map_err(|source| LoggingError::Directory {
        path: directory.clone(),
        source,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&directory)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(file_level);

    let console_filter = EnvFilter::builder()
        .with_default_directive(console_level.into())
        .from_env_lossy();
    let console_layer = fmt::layer().with_filter(console_filter);

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer);

    Ok((subscriber, guard))
}

/// Install the process-wide logger.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard, LoggingError> {
    let (subscriber, guard) = build_subscriber(config)?;
    subscriber.try_init()?;

    tracing::info!(
        directory = %config.directory,
        file_level = %config.file_level,
        console_level = %config.console_level,
        "Logger initialized"
    );

    Ok(LogGuard { file: Some(guard) })
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    LevelFilter::from_str(level).map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}
