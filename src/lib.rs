//! Viewer State - shared path state for an image-processing desktop app
//!
//! Two observable cells hold the path of the image in the primary viewer
//! and the path of the image whose histogram is displayed. UI components
//! receive a `PathStateRegistry` at construction, write it when the user
//! opens or transforms an image, and subscribe to it to re-render.

pub mod bridge;
pub mod config;
pub mod driver;
pub mod error;
pub mod state;

// Re-export key types for convenience
pub use {
    bridge::{BridgedEvent, ChannelSink, EventSink, PathChangeEvent, PathEventBridge},
    config::{BridgeSettings, SettingsError, SettingsManager},
    error::{BridgeError, CommandError},
    state::{Observable, PathKind, PathSnapshot, PathStateRegistry, Subscription},
};
