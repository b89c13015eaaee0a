//! Error types for the btw reminder engine.

use std::path::PathBuf;

/// Top-level error type for the reminder notifier.
#[derive(Debug, thiserror::Error)]
pub enum BtwError {
    /// No configuration file has been persisted yet.
    #[error("config not found at {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Configuration exists but does not describe a valid [`AppConfig`](crate::config::AppConfig).
    #[error("config is corrupt: {0}")]
    ConfigCorrupt(String),

    /// The reminders file could not be opened or read.
    #[error("cannot read reminders from {}: {source}", path.display())]
    ReminderSource {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The reminders file exists but has zero bytes.
    #[error("reminders file {} is empty", .0.display())]
    EmptyReminders(PathBuf),

    /// Selection was attempted on an empty reminder list.
    #[error("no reminders to choose from")]
    EmptySelection,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An action input could not be started or read.
    #[error("action input failed: {context}: {source}")]
    ActionSource {
        /// What the input was doing.
        context: &'static str,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BtwError>;
