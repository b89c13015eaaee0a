//! A single reminder firing: read the reminders file, pick one, notify.

use crate::platform::Notifier;
use crate::reminders::read_reminders;
use crate::selector::Selector;
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;

/// Title of every reminder notification.
pub const NOTIFICATION_TITLE: &str = "btw";

/// What started a firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// The periodic timer elapsed.
    Scheduled,
    /// The user asked for a reminder.
    Manual,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => f.write_str("scheduled"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Result of one firing. None of these stop the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiringOutcome {
    /// A reminder was handed to the notifier.
    Delivered {
        /// Reminder text shown.
        reminder: String,
    },
    /// No reminder could be chosen (file missing, unreadable, empty, or
    /// comments only).
    Skipped {
        /// Human-readable cause.
        reason: String,
    },
    /// A reminder was chosen but the notifier failed.
    NotifyFailed {
        /// Reminder text that was not shown.
        reminder: String,
        /// Notifier error.
        error: String,
    },
}

impl FiringOutcome {
    /// The chosen reminder, if selection got that far.
    pub fn reminder(&self) -> Option<&str> {
        match self {
            Self::Delivered { reminder } | Self::NotifyFailed { reminder, .. } => Some(reminder),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns `true` when the notification was sent.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Record of a completed firing, published to the report channel.
#[derive(Debug, Clone)]
pub struct FiringReport {
    /// Why the firing ran.
    pub trigger: TriggerKind,
    /// What happened.
    pub outcome: FiringOutcome,
    /// When the worker was started.
    pub started_at: Instant,
    /// When the loop observed completion.
    pub finished_at: Instant,
}

/// Run one firing synchronously. Intended for a blocking worker thread.
pub fn fire_once(path: &Path, selector: &Mutex<Selector>, notifier: &dyn Notifier) -> FiringOutcome {
    let reminders = match read_reminders(path) {
        Ok(reminders) => reminders,
        Err(e) => {
            return FiringOutcome::Skipped {
                reason: e.to_string(),
            };
        }
    };

    let reminder = {
        let mut selector = selector.lock().unwrap_or_else(PoisonError::into_inner);
        match selector.pick(&reminders) {
            Ok(reminder) => reminder.to_owned(),
            Err(e) => {
                return FiringOutcome::Skipped {
                    reason: format!("{e} in {}", path.display()),
                };
            }
        }
    };

    match notifier.notify(NOTIFICATION_TITLE, &reminder) {
        Ok(()) => FiringOutcome::Delivered { reminder },
        Err(e) => FiringOutcome::NotifyFailed {
            reminder,
            error: format!("{e:#}"),
        },
    }
}
