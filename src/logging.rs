//! Log setup for the cast widget
//!
//! The host layout and the panel own the terminal, so everything goes to a
//! daily rolling file. `RUST_LOG` replaces the default filter.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "cast-widget";
const DEFAULT_FILTER: &str = "cast_widget=debug,reqwest=info,warn";

/// Start writing `<dir>/cast-widget.YYYY-MM-DD`.
///
/// Buffered lines are flushed when the returned guard is dropped, so keep it
/// until shutdown.
pub fn init_logging(dir: &Path) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all(dir).with_context(|| format!("Cannot create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .try_init()
        .context("A global subscriber is already installed")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %dir.display(),
        "Logging initialized"
    );
    Ok(guard)
}

/// Debug line when a remote player call starts
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "Player API call started");
    };
}

/// Outcome of a remote player call: debug on success, error with the cause otherwise
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "Player API call succeeded"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Player API call failed"),
        }
    };
}
