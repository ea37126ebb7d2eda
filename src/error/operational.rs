//! Operational error context and centralized reporting.

use std::{error::Error as StdError, fmt::Display};

use {
    anyhow::{Context, Error, Result as AnyhowResult},
    tracing::warn,
};

/// Converts a foreign error to `anyhow`, describing what was being done.
pub trait ResultExt<T> {
    /// Attaches `what` as the outermost context.
    fn add_contextf(self, what: impl Display) -> AnyhowResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn add_contextf(self, what: impl Display) -> AnyhowResult<T> {
        self.context(what.to_string())
    }
}

/// Routes recoverable errors to `tracing`.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Reports a recoverable error.
    pub fn warn(error: &Error, context: &str) {
        warn!(context = context, error = %Self::to_user_message(error), "Recoverable error");
    }

    /// Formats the full context chain on one line for display.
    #[must_use]
    pub fn to_user_message(error: &Error) -> String {
        format!("{error:#}")
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::error::{
        domain::BridgeError,
        operational::{ErrorReporter, ResultExt},
    };

    #[test]
    fn test_result_ext_keeps_source() {
        let result: Result<(), BridgeError> = Err(BridgeError::Sink {
            reason: "detached".to_string(),
        });
        let error = result.add_contextf("Forwarding image path").unwrap_err();

        assert_eq!(error.to_string(), "Forwarding image path");
        assert!(ErrorReporter::to_user_message(&error).contains("Sink error: detached"));
    }

    #[test]
    fn test_result_ext_with_contextf() {
        let result: Result<(), BridgeError> = Err(BridgeError::ChannelClosed {
            event: "active-histogram-update".to_string(),
        });
        let error = result
            .add_contextf(format_args!("Forwarding {} path", "histogram"))
            .unwrap_err();

        assert_eq!(error.to_string(), "Forwarding histogram path");
    }

    #[test]
    fn test_error_reporter_user_message() {
        let error = anyhow!("Root cause").context("Outer");
        assert_eq!(ErrorReporter::to_user_message(&error), "Outer: Root cause");
    }
}
