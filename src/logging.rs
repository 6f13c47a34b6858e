//! Tracing setup for the analysis service.
//!
//! Requests are logged to stdout, with a duplicate stream appended to a log file so degraded
//! analyses can be inspected after the fact. `STUDYLENS_LOG_FILE` overrides the file target;
//! the default is `logs/studylens.log` under the working directory.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_PATH: &str = "logs/studylens.log";

// Dropping the guard flushes and stops the writer thread, so it lives for the whole process.
static WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. When the log file cannot be opened
/// the service still runs with stdout logging alone.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false).compact();
    let file = file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();
}

fn file_writer() -> Option<NonBlocking> {
    let path = std::env::var("STUDYLENS_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory {}: {err}", parent.display());
                return None;
            }
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = WRITER_GUARD.set(guard);
    Some(writer)
}
