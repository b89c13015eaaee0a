//! Desktop integration ports.
//!
//! The scheduler only talks to the desktop through the [`Notifier`] and
//! [`FileOpener`] traits. [`create_notifier`] and [`create_opener`] return the
//! default adapters in [`desktop`]; tests inject their own implementations.

use std::path::Path;
use std::sync::Arc;

pub mod desktop;

/// Emits a tray-style desktop notification.
pub trait Notifier: Send + Sync {
    /// Show a notification with `title` and `body`.
    ///
    /// Called from a blocking worker thread, never concurrently with another
    /// call from the same scheduler.
    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

/// Opens a file with the user's default application.
pub trait FileOpener: Send + Sync {
    /// Start opening `path`. Must not wait for the application to exit.
    fn open(&self, path: &Path) -> anyhow::Result<()>;
}

/// Create the platform notifier.
pub fn create_notifier() -> Arc<dyn Notifier> {
    Arc::new(desktop::DesktopNotifier::default())
}

/// Create the platform file opener.
pub fn create_opener() -> Arc<dyn FileOpener> {
    Arc::new(desktop::SystemOpener)
}
