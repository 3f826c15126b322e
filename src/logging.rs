//! Tracing setup for applications embedding the client
//!
//! Logs go to the file from `PathManager::log_file_path()`, or to stderr
//! when no data directory is available.

use config::PathManager;
use std::sync::{Mutex, Once};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info,bsky_actions=debug";

static INIT: Once = Once::new();
static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the global tracing subscriber. Later calls are no-ops.
pub fn init_logging() {
    INIT.call_once(|| {
        let Some(path) = PathManager::log_file_path() else {
            init_stderr_logging();
            return;
        };

        if let Err(e) = PathManager::ensure_dirs_exist() {
            eprintln!("[bsky-actions] Failed to create app directories: {}", e);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path);

        match file {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                // Dropping the guard would stop the writer thread
                if let Ok(mut slot) = LOG_GUARD.lock() {
                    *slot = Some(guard);
                }

                let subscriber = tracing_subscriber::registry().with(env_filter()).with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                );

                match tracing::subscriber::set_global_default(subscriber) {
                    Ok(()) => tracing::info!("Logging initialized, writing to {:?}", path),
                    Err(e) => eprintln!("[bsky-actions] Failed to set tracing subscriber: {}", e),
                }
            }
            Err(e) => {
                eprintln!("[bsky-actions] Failed to open log file {:?}: {}", path, e);
                init_stderr_logging();
            }
        }
    });
}

fn init_stderr_logging() {
    let subscriber = tracing_subscriber::registry().with(env_filter()).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}
