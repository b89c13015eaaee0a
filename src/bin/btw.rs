//! btw binary: runs the reminder scheduler in the background.
//!
//! Commands are read from stdin one per line (`remind`, `open`, `config`,
//! `reload`, `quit`); Ctrl+C also quits. With stdin detached the scheduler
//! keeps running on its timer.

use btw::startup::{self, SHUTDOWN_GRACE};
use btw::{ConfigStore, Scheduler, action_channel, actions, btw_dirs};
use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
    let _log_guard = btw::logging::init(&btw_dirs::logs_dir())?;

    info!("btw v{} starting", env!("CARGO_PKG_VERSION"));

    // A firing abandoned on quit may still be blocked in the notifier; the
    // runtime gives it SHUTDOWN_GRACE before the process exits.
    startup::block_on_with_grace(run(), SHUTDOWN_GRACE)??;

    info!("btw shut down cleanly");
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let store = ConfigStore::default_location();
    let config = startup::prepare_config(&store).map_err(|e| {
        error!(error = %e, "cannot load configuration");
        anyhow::anyhow!("btw failed to start: {e}")
    })?;

    let (action_tx, action_rx) = action_channel();

    if let Err(e) = actions::spawn_stdin_source(action_tx.clone()) {
        warn!("stdin commands unavailable: {e}");
    }
    tokio::spawn(actions::forward_ctrl_c(action_tx));

    Scheduler::new(config, store, action_rx).run().await;
    Ok(())
}
