//! File logging. The terminal belongs to the TUI, so every event goes to
//! `.airepair/airepair.log` through a non-blocking writer.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_DIR: &str = ".airepair";
pub const LOG_FILE: &str = "airepair.log";

/// Filter directive variable, e.g. `AIREPAIR_LOG=airepair_core=debug`.
pub const LOG_ENV: &str = "AIREPAIR_LOG";

/// Installs the global subscriber. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init() -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(LOG_DIR)?;
    let appender = tracing_appender::rolling::never(LOG_DIR, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(std::io::Error::other)?;
    Ok(guard)
}
