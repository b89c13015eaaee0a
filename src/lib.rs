//! btw: a background reminder notifier.
//!
//! Every `reminder_period` (one hour by default) btw picks a random line from
//! a plain-text reminders file and shows it as a desktop notification. The
//! user can also ask for a reminder on demand, open the reminders or config
//! file, reload the config, or quit.
//!
//! # Architecture
//!
//! - **Config** ([`config`], [`startup`]): a JSON record under the per-user
//!   data directory, created with defaults on first run.
//! - **Reminder source** ([`reminders`]): re-reads and filters the reminders
//!   file on every firing.
//! - **Selector** ([`selector`]): uniform random choice.
//! - **Ports** ([`platform`]): notification and file-opening traits with
//!   desktop adapters.
//! - **Scheduler** ([`scheduler`]): the event loop joining the timer and the
//!   [`actions`] channel without overlapping firings.

pub mod actions;
pub mod btw_dirs;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod reminders;
pub mod scheduler;
pub mod selector;
pub mod startup;

pub use actions::{Action, ActionReceiver, ActionSender, action_channel};
pub use config::{AppConfig, ConfigStore};
pub use error::{BtwError, Result};
pub use scheduler::{FiringOutcome, FiringReport, Scheduler, TriggerKind};
pub use selector::Selector;
