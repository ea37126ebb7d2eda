//! Domain-specific error types using `thiserror`.

use std::{io::Error as IoError, result::Result as StdResult};

use {anyhow::Error, serde_json::Error as SerdeJsonError, thiserror::Error};

use crate::config::SettingsError;

/// Failures while forwarding path changes to an event sink.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The receiving end of the event channel has been dropped.
    #[error("Event channel closed while sending '{event}'")]
    ChannelClosed { event: String },
    /// A bounded event channel has no room left.
    #[error("Event channel full while sending '{event}'")]
    ChannelFull { event: String },
    /// The payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    /// Sink-specific failure.
    #[error("Sink error: {reason}")]
    Sink { reason: String },
    /// Bridge settings failed validation.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Failures parsing a line fed to the headless driver.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The first word is not a known command.
    #[error("Unknown command: {0}")]
    Unknown(String),
    /// A path command was given without its path argument.
    #[error("Missing path for '{command}'")]
    MissingPath { command: String },
    /// Reading the input stream failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

/// Operational error context propagation with `anyhow`.
pub type Result<T> = StdResult<T, Error>;

#[cfg(test)]
mod tests {
    use crate::{
        config::SettingsError,
        error::domain::{BridgeError, CommandError},
    };

    #[test]
    fn test_bridge_error_display() {
        let closed = BridgeError::ChannelClosed {
            event: "active-path-change".to_string(),
        };
        assert_eq!(
            closed.to_string(),
            "Event channel closed while sending 'active-path-change'"
        );

        let sink = BridgeError::Sink {
            reason: "window gone".to_string(),
        };
        assert_eq!(sink.to_string(), "Sink error: window gone");

        let settings: BridgeError = SettingsError::InvalidValue {
            reason: "empty event name".to_string(),
        }
        .into();
        assert_eq!(
            settings.to_string(),
            "Settings error: Invalid settings value: empty event name"
        );
    }

    #[test]
    fn test_command_error_display() {
        assert_eq!(
            CommandError::Unknown("zoom".to_string()).to_string(),
            "Unknown command: zoom"
        );
        assert_eq!(
            CommandError::MissingPath {
                command: "image".to_string()
            }
            .to_string(),
            "Missing path for 'image'"
        );
    }
}
