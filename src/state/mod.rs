//! Shared path state observed by the image and histogram views.
//!
//! `observable` provides the generic cell; `path_registry` composes two of
//! them into the registry handed to UI components.

pub mod observable;
pub mod path_registry;

pub use {
    observable::{Observable, Subscription},
    path_registry::{PathKind, PathSnapshot, PathStateRegistry},
};
