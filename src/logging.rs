//! File-based logging for the MeloMarket client
//!
//! The TUI owns the terminal, so logs go to a daily-rotated file under
//! `.logs/` (or `MELOMARKET_LOG_DIR`). The returned guard must stay alive
//! for the lifetime of the process or buffered lines are lost.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR_ENV: &str = "MELOMARKET_LOG_DIR";
const DEFAULT_LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "melomarket";

/// Initialize the logging system.
///
/// Log level defaults to debug for this crate and warn elsewhere; override
/// with `RUST_LOG`.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_dir =
        std::env::var(LOG_DIR_ENV).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR));
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    // Non-blocking writer so a slow disk never stalls the event loop
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("melomarket=debug,reqwest=info,rodio=info,warn"));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!(dir = %log_dir.display(), "Logging initialized");

    Ok(guard)
}

/// Log a marketplace API request and its result
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}
