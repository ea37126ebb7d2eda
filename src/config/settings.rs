//! Bridge settings management with XDG Base Directory compliance.
//!
//! Only the bridge configuration is persisted. The path cells always start
//! unset and are never written to disk.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

/// Default event name for image path changes.
pub const DEFAULT_IMAGE_EVENT: &str = "active-path-change";

/// Default event name for histogram path changes.
pub const DEFAULT_HISTOGRAM_EVENT: &str = "active-histogram-update";

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// How path changes are forwarded to an event sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Event name emitted when the active image path changes.
    pub image_event_name: String,
    /// Event name emitted when the active histogram path changes.
    pub histogram_event_name: String,
    /// Skip forwarding a value equal to the last one forwarded for that cell.
    pub skip_unchanged_paths: bool,
    /// Capacity of the event channel (0 = unbounded).
    pub event_channel_capacity: usize,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            image_event_name: DEFAULT_IMAGE_EVENT.to_string(),
            histogram_event_name: DEFAULT_HISTOGRAM_EVENT.to_string(),
            skip_unchanged_paths: false,
            event_channel_capacity: 0,
        }
    }
}

impl BridgeSettings {
    /// Checks that both event names are usable.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` if a name is blank or both
    /// names are the same.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.image_event_name.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                reason: "image_event_name is empty".to_string(),
            });
        }
        if self.histogram_event_name.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                reason: "histogram_event_name is empty".to_string(),
            });
        }
        if self.image_event_name == self.histogram_event_name {
            return Err(SettingsError::InvalidValue {
                reason: format!(
                    "image and histogram events share the name '{}'",
                    self.image_event_name
                ),
            });
        }
        Ok(())
    }
}

/// Handles loading, saving, and validation of bridge settings.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe settings storage.
    settings: RwLock<BridgeSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a settings manager using the default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a settings manager with a custom config path.
    ///
    /// A missing file yields default settings; nothing is written until
    /// `update_settings` is called.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file exists but cannot be read,
    /// parsed, or validated.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings = if config_path.exists() {
            debug!("Loading bridge settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            let settings: BridgeSettings = from_str(&contents)?;
            settings.validate()?;
            settings
        } else {
            debug!("No settings file at {:?}, using defaults", config_path);
            BridgeSettings::default()
        };

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, BridgeSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Validates, applies and saves new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if validation fails or the file cannot be
    /// written. Invalid settings are not applied.
    pub fn update_settings(&self, new_settings: BridgeSettings) -> Result<(), SettingsError> {
        new_settings.validate()?;
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving bridge settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Returns `$XDG_CONFIG_HOME/viewer-state/settings.json`.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("viewer-state");
    config_dir.push("settings.json");
    config_dir
}

/// Uses `XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use {
        serde_json::{from_str, to_string},
        tempfile::TempDir,
    };

    use crate::config::settings::{
        BridgeSettings, DEFAULT_HISTOGRAM_EVENT, DEFAULT_IMAGE_EVENT, SettingsError,
        SettingsManager,
    };

    #[test]
    fn test_bridge_settings_default() {
        let settings = BridgeSettings::default();
        assert_eq!(settings.image_event_name, DEFAULT_IMAGE_EVENT);
        assert_eq!(settings.histogram_event_name, DEFAULT_HISTOGRAM_EVENT);
        assert!(!settings.skip_unchanged_paths);
        assert_eq!(settings.event_channel_capacity, 0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_bridge_settings_serialization() {
        let settings = BridgeSettings {
            image_event_name: "image-changed".to_string(),
            histogram_event_name: "histogram-changed".to_string(),
            skip_unchanged_paths: true,
            event_channel_capacity: 8,
        };

        let serialized = to_string(&settings).unwrap();
        let deserialized: BridgeSettings = from_str(&serialized).unwrap();
        assert_eq!(settings, deserialized);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: BridgeSettings = from_str(r#"{"skip_unchanged_paths": true}"#).unwrap();
        assert!(settings.skip_unchanged_paths);
        assert_eq!(settings.image_event_name, DEFAULT_IMAGE_EVENT);
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let blank = BridgeSettings {
            image_event_name: "  ".to_string(),
            ..BridgeSettings::default()
        };
        assert!(matches!(
            blank.validate(),
            Err(SettingsError::InvalidValue { .. })
        ));

        let clash = BridgeSettings {
            histogram_event_name: DEFAULT_IMAGE_EVENT.to_string(),
            ..BridgeSettings::default()
        };
        let error = clash.validate().unwrap_err();
        assert!(error.to_string().contains("share the name"));
    }

    #[test]
    fn test_missing_file_uses_defaults_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");

        let manager = SettingsManager::with_config_path(path.clone()).unwrap();

        assert_eq!(*manager.get_settings(), BridgeSettings::default());
        assert_eq!(manager.get_config_path(), &path);
        assert!(!path.exists());
    }

    #[test]
    fn test_settings_persist_across_managers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        let manager = SettingsManager::with_config_path(path.clone()).unwrap();
        let mut updated = manager.get_settings().clone();
        updated.skip_unchanged_paths = true;
        updated.event_channel_capacity = 4;
        manager.update_settings(updated.clone()).unwrap();

        let reloaded = SettingsManager::with_config_path(path).unwrap();
        assert_eq!(*reloaded.get_settings(), updated);
    }

    #[test]
    fn test_invalid_update_is_not_applied() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            SettingsManager::with_config_path(temp_dir.path().join("settings.json")).unwrap();

        let result = manager.update_settings(BridgeSettings {
            histogram_event_name: String::new(),
            ..BridgeSettings::default()
        });

        assert!(result.is_err());
        assert_eq!(*manager.get_settings(), BridgeSettings::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        write(&path, "{ not json").unwrap();

        let result = SettingsManager::with_config_path(path);
        assert!(matches!(result, Err(SettingsError::SerializationError(_))));
    }
}
