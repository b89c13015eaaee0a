//! Persisted application configuration.
//!
//! The configuration is a small JSON record stored at
//! `<data root>/btw_reminders/config.json`. It is only ever replaced as a
//! whole: [`ConfigStore::save`] overwrites the file and the scheduler swaps in
//! a freshly loaded [`AppConfig`] on reload.

use crate::btw_dirs::{self, CONFIG_FILE_NAME, REMINDERS_FILE_NAME};
use crate::error::{BtwError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Default interval between automatic reminders.
pub const DEFAULT_REMINDER_PERIOD: Duration = Duration::from_secs(60 * 60);

/// User settings for the reminder notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path of the reminders text file.
    #[serde(rename = "reminders_file_path")]
    pub reminders_path: PathBuf,
    /// Time between automatic reminders, persisted as integer nanoseconds.
    #[serde(with = "duration_nanos")]
    pub reminder_period: Duration,
}

impl AppConfig {
    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`BtwError::ConfigCorrupt`] when the reminder period is zero.
    pub fn validate(&self) -> Result<()> {
        if self.reminder_period.is_zero() {
            return Err(BtwError::ConfigCorrupt(
                "reminder_period must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Reads and writes the persisted [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    data_root: PathBuf,
}

impl ConfigStore {
    /// Store rooted at `data_root`; files live in `data_root/btw_reminders/`.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    /// Store rooted at the per-user data directory (see [`btw_dirs::data_root`]).
    pub fn default_location() -> Self {
        Self::new(btw_dirs::data_root())
    }

    /// Directory holding the config and default reminders file.
    pub fn app_dir(&self) -> PathBuf {
        btw_dirs::app_dir_in(&self.data_root)
    }

    /// Location of the persisted config file.
    pub fn config_path(&self) -> PathBuf {
        self.app_dir().join(CONFIG_FILE_NAME)
    }

    /// Load the persisted configuration.
    ///
    /// # Errors
    ///
    /// - [`BtwError::ConfigNotFound`] when no config has been saved yet.
    /// - [`BtwError::ConfigCorrupt`] when the file does not parse or fails
    ///   [`AppConfig::validate`].
    /// - [`BtwError::Io`] for any other read failure.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_path();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BtwError::ConfigNotFound(path));
            }
            Err(e) => return Err(BtwError::Io(e)),
        };

        let config: AppConfig = serde_json::from_slice(&bytes).map_err(|e| {
            BtwError::ConfigCorrupt(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Default configuration for a first run. Does not touch disk.
    pub fn bootstrap(&self) -> AppConfig {
        AppConfig {
            reminders_path: self.app_dir().join(REMINDERS_FILE_NAME),
            reminder_period: DEFAULT_REMINDER_PERIOD,
        }
    }

    /// Persist `config`, creating parent directories as needed.
    ///
    /// The record is serialized in full before the file is opened, so a
    /// serialization failure never truncates an existing config.
    ///
    /// # Errors
    ///
    /// Returns [`BtwError::Io`] if the directory or file cannot be written.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| BtwError::ConfigCorrupt(format!("cannot serialize config: {e}")))?;

        let path = self.config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, json)?;

        info!(path = %path.display(), "saved config");
        Ok(())
    }
}

mod duration_nanos {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos())
            .map_err(|_| S::Error::custom("duration does not fit in u64 nanoseconds"))?;
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}
