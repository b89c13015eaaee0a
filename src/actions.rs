//! User actions and the sources that deliver them to the scheduler.
//!
//! The tray menu is outside this crate; anything that can push an [`Action`]
//! into an [`ActionSender`] can drive the scheduler. Two sources ship here:
//!
//! - [`spawn_stdin_source`] reads one command per line from stdin
//!   (`remind`, `open`, `config`, `reload`, `quit`).
//! - [`forward_ctrl_c`] turns Ctrl+C into [`Action::Quit`].

use crate::error::{BtwError, Result};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Sending half of the action channel.
pub type ActionSender = mpsc::UnboundedSender<Action>;

/// Receiving half of the action channel, owned by the scheduler.
pub type ActionReceiver = mpsc::UnboundedReceiver<Action>;

/// Create the channel that carries user actions to the scheduler.
pub fn action_channel() -> (ActionSender, ActionReceiver) {
    mpsc::unbounded_channel()
}

/// A discrete request from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Show a reminder right away.
    RemindNow,
    /// Open the reminders file in the default editor.
    OpenRemindersFile,
    /// Open the config file in the default editor.
    OpenConfigFile,
    /// Re-read the config file and replace the live settings.
    ReloadConfig,
    /// Stop the scheduler.
    Quit,
}

impl Action {
    /// Canonical command word accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemindNow => "remind",
            Self::OpenRemindersFile => "open",
            Self::OpenConfigFile => "config",
            Self::ReloadConfig => "reload",
            Self::Quit => "quit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognized command word.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}' (expected remind, open, config, reload or quit)")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remind" | "remind-now" | "r" => Ok(Self::RemindNow),
            "open" | "open-reminders" | "edit" | "o" => Ok(Self::OpenRemindersFile),
            "config" | "open-config" | "c" => Ok(Self::OpenConfigFile),
            "reload" | "reload-config" => Ok(Self::ReloadConfig),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(UnknownAction(other.to_owned())),
        }
    }
}

/// Read commands from stdin on a dedicated thread.
///
/// Stdin reads cannot be cancelled, so they stay off the tokio runtime; the
/// thread is never joined and ends with the process.
///
/// # Errors
///
/// Returns [`BtwError::ActionSource`] if the thread cannot be spawned.
pub fn spawn_stdin_source(tx: ActionSender) -> Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("btw-stdin".to_owned())
        .spawn(move || {
            if let Err(e) = run_line_source(std::io::stdin().lock(), tx) {
                warn!("stdin action source stopped: {e}");
            }
        })
        .map_err(|source| BtwError::ActionSource {
            context: "cannot spawn stdin reader",
            source,
        })
}

/// Feed commands from any line reader into `tx` until EOF or `quit`.
///
/// Blank lines are skipped and unknown words are logged. EOF ends the source
/// without sending [`Action::Quit`], so a detached stdin does not stop the
/// notifier.
///
/// # Errors
///
/// Returns [`BtwError::ActionSource`] if the reader fails.
pub fn run_line_source<R: BufRead>(mut reader: R, tx: ActionSender) -> Result<()> {
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .map_err(|source| BtwError::ActionSource {
                context: "failed to read line",
                source,
            })?;

        if bytes_read == 0 {
            debug!("action input closed (EOF)");
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let action = match trimmed.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };

        if tx.send(action).is_err() {
            debug!("scheduler stopped; closing action input");
            return Ok(());
        }
        if action == Action::Quit {
            return Ok(());
        }
    }
}

/// Send [`Action::Quit`] when the process receives Ctrl+C.
pub async fn forward_ctrl_c(tx: ActionSender) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("received Ctrl+C, shutting down...");
            let _ = tx.send(Action::Quit);
        }
        Err(e) => {
            warn!("cannot listen for Ctrl+C: {e}");
            // Keep the sender alive so the channel stays open for other sources.
            std::future::pending::<()>().await;
        }
    }
}
