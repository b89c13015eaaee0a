//! Process lifecycle: obtain a valid configuration before the scheduler runs,
//! and bound how long shutdown waits on leftover work.
//!
//! Call [`prepare_config`] once at launch. Any error it returns is fatal; the
//! event loop must not start with an unknown configuration.

use crate::config::{AppConfig, ConfigStore};
use crate::error::{BtwError, Result};
use crate::reminders;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long shutdown waits for an abandoned firing still blocked in the
/// notifier before the process exits anyway.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Load the persisted config, creating defaults on first run, and make sure
/// the reminders file exists.
///
/// - Missing config: bootstrap defaults and save them.
/// - Missing reminders file: write the default template. A failure here is
///   only logged; the scheduler reports the unreadable file on each firing.
///
/// # Errors
///
/// Returns the load error when the config exists but cannot be read or
/// parsed, or the save error when first-run defaults cannot be written.
pub fn prepare_config(store: &ConfigStore) -> Result<AppConfig> {
    let config = match store.load() {
        Ok(config) => {
            info!(path = %store.config_path().display(), "loaded config");
            config
        }
        Err(BtwError::ConfigNotFound(path)) => {
            info!(path = %path.display(), "no config found, creating default config");
            let config = store.bootstrap();
            store.save(&config)?;
            config
        }
        Err(e) => return Err(e),
    };

    if let Err(e) = reminders::ensure_reminders_file(&config.reminders_path) {
        warn!(
            path = %config.reminders_path.display(),
            "failed to write default template to new reminders file: {e}"
        );
    }

    Ok(config)
}

/// Drive `future` to completion on a new multi-thread runtime, then shut the
/// runtime down waiting at most `grace` for detached blocking tasks.
///
/// # Errors
///
/// Returns [`BtwError::Io`] if the runtime cannot be built.
pub fn block_on_with_grace<F: Future>(future: F, grace: Duration) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("btw-runtime")
        .build()?;

    let output = runtime.block_on(future);

    debug!(?grace, "shutting down runtime");
    runtime.shutdown_timeout(grace);
    Ok(output)
}
