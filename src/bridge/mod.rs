//! Forwards path-cell changes to an event sink as named events.
//!
//! The desktop front end listens for two events, one per cell, each
//! carrying `{"path": <string|null>}`. `PathEventBridge` subscribes to both
//! cells of a `PathStateRegistry` and emits those events on every
//! notification, including the initial one delivered on connect.

pub mod sink;


use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering::Relaxed},
};

use {
    parking_lot::Mutex,
    serde::{Deserialize, Serialize},
    tracing::{debug, trace},
};

use crate::{
    config::BridgeSettings,
    error::{BridgeError, ErrorReporter, ResultExt},
    state::{PathKind, PathStateRegistry, Subscription},
};

pub use sink::{BridgedEvent, ChannelSink, EventSink};

/// Payload of a path-change event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChangeEvent {
    /// New path, or `None` when the cell was cleared.
    pub path: Option<String>,
}

/// Delivery counters shared by both forwarders of a bridge.
#[derive(Debug, Default)]
struct BridgeStats {
    forwarded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Forwards one cell's notifications to the sink.
struct Forwarder {
    kind: PathKind,
    event_name: String,
    sink: Arc<dyn EventSink>,
    skip_unchanged: bool,
    last_forwarded: Mutex<Option<Option<String>>>,
    stats: Arc<BridgeStats>,
}

impl Forwarder {
    fn forward(&self, path: &Option<String>) {
        if self.skip_unchanged && self.last_forwarded.lock().as_ref() == Some(path) {
            self.stats.skipped.fetch_add(1, Relaxed);
            trace!(event = %self.event_name, path = ?path, "Skipping unchanged path");
            return;
        }

        let payload = PathChangeEvent { path: path.clone() };
        let result = self
            .sink
            .emit(&self.event_name, &payload)
            .add_contextf(format_args!(
                "Forwarding {} path as '{}'",
                self.kind, self.event_name
            ));

        match result {
            Ok(()) => {
                self.stats.forwarded.fetch_add(1, Relaxed);
                if self.skip_unchanged {
                    *self.last_forwarded.lock() = Some(payload.path);
                }
                debug!(event = %self.event_name, path = ?path, "Forwarded path change");
            }
            Err(error) => {
                self.stats.failed.fetch_add(1, Relaxed);
                ErrorReporter::warn(&error, "path_event_bridge");
            }
        }
    }
}

/// Returns the configured event name for `kind`.
#[must_use]
pub fn event_name(settings: &BridgeSettings, kind: PathKind) -> &str {
    match kind {
        PathKind::Image => &settings.image_event_name,
        PathKind::Histogram => &settings.histogram_event_name,
    }
}

/// Live connection between a registry and an event sink.
///
/// Dropping the bridge disconnects it.
pub struct PathEventBridge {
    subscriptions: Vec<Subscription>,
    stats: Arc<BridgeStats>,
}

impl PathEventBridge {
    /// Subscribes to both cells of `registry` and forwards every change to
    /// `sink`.
    ///
    /// The current value of each cell is forwarded immediately.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Settings` if `settings` fail validation.
    pub fn connect(
        registry: &PathStateRegistry,
        sink: Arc<dyn EventSink>,
        settings: &BridgeSettings,
    ) -> Result<Self, BridgeError> {
        settings.validate()?;
        let stats = Arc::new(BridgeStats::default());

        let subscriptions = PathKind::ALL
            .into_iter()
            .map(|kind| {
                let forwarder = Forwarder {
                    kind,
                    event_name: event_name(settings, kind).to_string(),
                    sink: sink.clone(),
                    skip_unchanged: settings.skip_unchanged_paths,
                    last_forwarded: Mutex::new(None),
                    stats: stats.clone(),
                };
                registry.subscribe(kind, move |path| forwarder.forward(path))
            })
            .collect();

        debug!(
            image_event = %settings.image_event_name,
            histogram_event = %settings.histogram_event_name,
            skip_unchanged = settings.skip_unchanged_paths,
            "PathEventBridge: Connected"
        );

        Ok(Self {
            subscriptions,
            stats,
        })
    }

    /// Stops forwarding. Safe to call more than once.
    pub fn disconnect(&self) {
        if self.is_connected() {
            debug!("PathEventBridge: Disconnecting");
        }
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }

    /// Returns whether either cell is still being forwarded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    /// Number of events delivered to the sink.
    #[must_use]
    pub fn forwarded(&self) -> u64 {
        self.stats.forwarded.load(Relaxed)
    }

    /// Number of notifications suppressed as unchanged.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.stats.skipped.load(Relaxed)
    }

    /// Number of events the sink rejected.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.stats.failed.load(Relaxed)
    }
}

impl Drop for PathEventBridge {
    fn drop(&mut self) {
        self.disconnect();
    }
}
