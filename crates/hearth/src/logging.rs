//! Tracing setup: compact stderr output plus a daily rolling JSON file.

use crate::{AppError, AppResult, StartupMode, config::Config};

use std::{io, panic::Location};

use error_location::ErrorLocation;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the file writer flushing until dropped. Hold it for the process
/// lifetime.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter directive in effect: `RUST_LOG`, then the config's `log_filter`,
/// then the mode default.
pub fn filter_directive(
    mode: StartupMode,
    configured: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    rust_log
        .filter(|directive| !directive.trim().is_empty())
        .or(configured)
        .unwrap_or(mode.default_log_filter())
        .to_string()
}

/// Install the global subscriber.
#[track_caller]
pub fn init(mode: StartupMode, config: &Config) -> AppResult<LoggingGuard> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(mode, config.log_filter.as_deref(), rust_log.as_deref());
    let env_filter = EnvFilter::try_new(&directive).map_err(|e| AppError::LoggingSetup {
        reason: format!("Invalid log filter '{directive}': {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let (file_layer, file_guard, file_error) = match open_log_file() {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_current_span(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| AppError::LoggingSetup {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    match file_error {
        None => tracing::info!(%mode, filter = %directive, "Logging initialized"),
        Some(e) => tracing::warn!(error = %e, "File logging unavailable, using stderr only"),
    }

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn open_log_file() -> AppResult<RollingFileAppender> {
    let log_dir = Config::log_dir()?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("hearth")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| AppError::LoggingSetup {
            reason: format!("Failed to open log directory {}: {}", log_dir.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })
}
