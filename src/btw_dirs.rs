//! Centralized application directory paths for btw.
//!
//! Everything btw persists lives under a single per-user directory:
//!
//! | Purpose | Path |
//! |---------|------|
//! | Config | `<data root>/btw_reminders/config.json` |
//! | Reminders | `<data root>/btw_reminders/reminders.txt` |
//! | Logs | `<data root>/btw_reminders/logs/` |
//!
//! The data root is [`dirs::data_dir`] (`~/.local/share` on Linux,
//! `~/Library/Application Support` on macOS, `%APPDATA%` on Windows).
//!
//! # Environment Overrides
//!
//! - `BTW_DATA_DIR`: overrides [`data_root`]

use std::path::{Path, PathBuf};

/// Subdirectory of the data root that holds all btw files.
pub const APP_DIR_NAME: &str = "btw_reminders";

/// File name of the persisted configuration.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// File name of the default reminders file.
pub const REMINDERS_FILE_NAME: &str = "reminders.txt";

/// Per-user data root.
///
/// Resolves to `dirs::data_dir()` by default. Override with the
/// `BTW_DATA_DIR` environment variable.
#[must_use]
pub fn data_root() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("BTW_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir().unwrap_or_else(|| std::env::temp_dir().join("btw-data"))
}

/// btw directory inside `root`.
#[must_use]
pub fn app_dir_in(root: &Path) -> PathBuf {
    root.join(APP_DIR_NAME)
}

/// btw directory inside the default data root.
#[must_use]
pub fn app_dir() -> PathBuf {
    app_dir_in(&data_root())
}

/// Log file directory (`app_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    app_dir().join("logs")
}
