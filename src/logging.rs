//! Logging setup: human-readable diagnostics appended to a log file and
//! mirrored to the console.

use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the file writer alive; dropping it flushes and closes the log file.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// Initialize tracing with dual output: append-only file plus stdout.
///
/// The filter defaults to `info` and can be overridden via `RUST_LOG`.
pub fn init(log_path: &Path) -> Result<LogGuard> {
    let dir = log_path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
    }

    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log path has no file name: {}", log_path.display()))?;
    let file_appender = tracing_appender::rolling::never(
        dir.unwrap_or_else(|| Path::new(".")),
        file_name.to_os_string(),
    );
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}
