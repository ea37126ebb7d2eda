//! Error handling built on `thiserror` and `anyhow`.
//!
//! Domain enums describe failures of the event bridge and the headless
//! driver; the operational helpers add context and route reports through
//! `tracing`. The path cells themselves never fail.

pub mod domain;
pub mod operational;

pub use {
    domain::{BridgeError, CommandError},
    operational::{ErrorReporter, ResultExt},
};
