//! Event sinks that receive forwarded path changes.

use {
    async_channel::{Receiver, Sender, TrySendError, bounded, unbounded},
    serde::{Deserialize, Serialize},
    serde_json::to_string,
    tracing::trace,
};

use crate::{bridge::PathChangeEvent, error::BridgeError};

/// Destination for named path-change events, such as a web view or an
/// in-process queue.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the event could not be delivered.
    fn emit(&self, event: &str, payload: &PathChangeEvent) -> Result<(), BridgeError>;
}

impl<F> EventSink for F
where
    F: Fn(&str, &PathChangeEvent) -> Result<(), BridgeError> + Send + Sync,
{
    fn emit(&self, event: &str, payload: &PathChangeEvent) -> Result<(), BridgeError> {
        self(event, payload)
    }
}

/// An event together with the name it was emitted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgedEvent {
    /// Event name.
    pub event: String,
    /// Event payload.
    pub payload: PathChangeEvent,
}

impl BridgedEvent {
    /// Encodes the event as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(to_string(self)?)
    }
}

/// Sink that queues events on an `async_channel` for an async consumer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<BridgedEvent>,
}

impl ChannelSink {
    /// Creates the sink and the receiver that drains it.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Queue bound; 0 means unbounded.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, Receiver<BridgedEvent>) {
        let (tx, rx) = if capacity == 0 {
            unbounded()
        } else {
            bounded(capacity)
        };
        (Self { tx }, rx)
    }

    /// Closes the channel; queued events stay readable.
    pub fn close(&self) {
        self.tx.close();
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &str, payload: &PathChangeEvent) -> Result<(), BridgeError> {
        trace!(event = event, queued = self.tx.len(), "ChannelSink: Queueing event");
        self.tx
            .try_send(BridgedEvent {
                event: event.to_string(),
                payload: payload.clone(),
            })
            .map_err(|error| match error {
                TrySendError::Full(_) => BridgeError::ChannelFull {
                    event: event.to_string(),
                },
                TrySendError::Closed(_) => BridgeError::ChannelClosed {
                    event: event.to_string(),
                },
            })
    }
}
