//! Tracing subscriber setup for the btw binary.
//!
//! Logs go to stderr and to a daily-rolling file under
//! [`btw_dirs::logs_dir`](crate::btw_dirs::logs_dir). `RUST_LOG` overrides the
//! default `btw=info` filter.

use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "btw=info";

/// Install the global subscriber.
///
/// Returns the file writer guard, which must be held for the life of the
/// process so buffered lines are flushed. `None` means file logging could not
/// be set up and only stderr is used.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(log_dir: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match build_file_writer(log_dir) {
        Ok((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        ),
        Err(e) => {
            eprintln!(
                "failed to initialize file logging in {}, using stderr only: {e}",
                log_dir.display()
            );
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn build_file_writer(
    log_dir: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("btw")
        .filename_suffix("log")
        .build(log_dir)?;
    Ok(tracing_appender::non_blocking(appender))
}
