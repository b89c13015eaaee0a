//! Reminder scheduler.
//!
//! Waits out a startup delay, then fires a reminder every
//! `reminder_period` while serving user actions from the action channel.

pub mod firing;
pub mod runner;

pub use firing::{FiringOutcome, FiringReport, NOTIFICATION_TITLE, TriggerKind};
pub use runner::{DEFAULT_STARTUP_DELAY, Phase, ScheduleState, Scheduler};
