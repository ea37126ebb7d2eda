//! Settings for the path event bridge, persisted as JSON under the XDG
//! config directory.

pub mod settings;

pub use settings::{BridgeSettings, SettingsError, SettingsManager, get_config_path};
