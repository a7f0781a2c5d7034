use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "routerchat.log";

/// `<data_local_dir>/routerchat`, where the log file lives.
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("routerchat"))
}

/// Routes `tracing` output to a log file, since the terminal belongs to the
/// UI. Filtered by `RUST_LOG`, default `info`.
///
/// Returns `None` (and logs nowhere) when no writable log directory exists.
/// The guard must live until exit so buffered lines are flushed.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).ok()?;
    Some(guard)
}
