//! Observable value cells with synchronous subscriber notification.
//!
//! An `Observable<T>` holds a single value and a list of subscriber
//! callbacks. Every write commits the new value and then runs one
//! notification pass over the live subscribers before returning. A write
//! made from inside a callback is queued and delivered after the current
//! pass, so every subscriber sees writes in the order they were made.

use std::{
    collections::VecDeque,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        Arc, Weak,
        atomic::{
            AtomicBool, AtomicU64,
            Ordering::{AcqRel, Acquire, Relaxed},
        },
    },
    thread::panicking,
};

use {
    parking_lot::{Mutex, RwLock},
    tracing::{debug, trace},
};

type SubscriberId = u64;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A registered subscriber callback.
struct Subscriber<T> {
    id: SubscriberId,
    active: Arc<AtomicBool>,
    callback: Callback<T>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: self.active.clone(),
            callback: self.callback.clone(),
        }
    }
}

/// Shared storage behind an `Observable` and its clones.
struct Inner<T> {
    label: &'static str,
    value: RwLock<T>,
    subscribers: RwLock<Vec<Subscriber<T>>>,
    next_id: AtomicU64,
    dispatch: Mutex<Dispatch<T>>,
}

/// Writes waiting for a notification pass.
struct Dispatch<T> {
    notifying: bool,
    pending: VecDeque<T>,
}

/// Resets the dispatch state when a callback panics mid-loop.
struct DispatchGuard<'a, T> {
    dispatch: &'a Mutex<Dispatch<T>>,
}

impl<T> Drop for DispatchGuard<'_, T> {
    fn drop(&mut self) {
        if !panicking() {
            return;
        }
        let mut dispatch = self.dispatch.lock();
        dispatch.notifying = false;
        dispatch.pending.clear();
    }
}

/// Removal hook used by `Subscription` without knowing the cell's value type.
trait Detach: Send + Sync {
    fn detach(&self, id: SubscriberId);
}

impl<T: Send + Sync> Detach for Inner<T> {
    fn detach(&self, id: SubscriberId) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|subscriber| subscriber.id != id);
        debug!(
            cell = self.label,
            subscriber = id,
            remaining = subscribers.len(),
            "Observer unsubscribed"
        );
    }
}

/// A shared, observable value.
///
/// Cloning an `Observable` yields another handle to the same cell. No lock
/// is held while callbacks run, so a callback may read, write or subscribe
/// to any cell, including the one notifying it. Nested writes to the same
/// cell are delivered after the pass that triggered them.
pub struct Observable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Observable")
            .field("label", &self.inner.label)
            .field("value", &*self.inner.value.read())
            .field("subscribers", &self.inner.subscribers.read().len())
            .finish()
    }
}

impl<T: Default + Clone + Send + Sync + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Creates an unlabelled cell holding `initial`.
    pub fn new(initial: T) -> Self {
        Self::named("observable", initial)
    }

    /// Creates a cell whose label appears in log output.
    ///
    /// # Arguments
    ///
    /// * `label` - Name used in tracing fields.
    /// * `initial` - Starting value.
    pub fn named(label: &'static str, initial: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                label,
                value: RwLock::new(initial),
                subscribers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
                dispatch: Mutex::new(Dispatch {
                    notifying: false,
                    pending: VecDeque::new(),
                }),
            }),
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Replaces the current value and notifies every live subscriber.
    ///
    /// Equal values are not filtered out: each call runs a full
    /// notification pass. Called from inside a callback, the value is
    /// committed at once and its pass runs after the current one.
    pub fn set(&self, value: T) {
        *self.inner.value.write() = value.clone();

        {
            let mut dispatch = self.inner.dispatch.lock();
            dispatch.pending.push_back(value);
            if dispatch.notifying {
                trace!(
                    cell = self.inner.label,
                    queued = dispatch.pending.len(),
                    "Queueing nested write"
                );
                return;
            }
            dispatch.notifying = true;
        }

        let _guard = DispatchGuard {
            dispatch: &self.inner.dispatch,
        };
        loop {
            let next = {
                let mut dispatch = self.inner.dispatch.lock();
                match dispatch.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        dispatch.notifying = false;
                        break;
                    }
                }
            };
            self.notify(&next);
        }
    }

    /// Computes a new value from a copy of the current one and writes it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.get());
        self.set(next);
    }

    /// Registers `callback`, calling it immediately with the current value
    /// and again after every subsequent write.
    ///
    /// # Returns
    ///
    /// A `Subscription` that removes the callback when unsubscribed.
    /// Dropping the handle leaves the callback registered.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let callback: Callback<T> = Arc::new(callback);

        let current = self.get();
        {
            let mut subscribers = self.inner.subscribers.write();
            subscribers.push(Subscriber {
                id,
                active: active.clone(),
                callback: callback.clone(),
            });
            debug!(
                cell = self.inner.label,
                subscriber = id,
                total = subscribers.len(),
                "Observer subscribed"
            );
        }

        callback(&current);

        let owner: Arc<dyn Detach> = self.inner.clone();
        Subscription {
            id,
            active,
            owner: Arc::downgrade(&owner),
        }
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Runs one notification pass over a snapshot of the subscriber list.
    fn notify(&self, value: &T) {
        let snapshot: Vec<Subscriber<T>> = self.inner.subscribers.read().clone();
        trace!(
            cell = self.inner.label,
            subscribers = snapshot.len(),
            "Notifying observers"
        );

        for subscriber in snapshot {
            // Removed by an earlier callback in this same pass.
            if !subscriber.active.load(Acquire) {
                continue;
            }
            (subscriber.callback)(value);
        }
    }
}

/// Handle returned by `Observable::subscribe`.
#[must_use = "dropping a Subscription leaves the observer registered with no way to remove it"]
pub struct Subscription {
    id: SubscriberId,
    active: Arc<AtomicBool>,
    owner: Weak<dyn Detach>,
}

impl Subscription {
    /// Removes the observer from its cell. Later calls do nothing.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, AcqRel) {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            owner.detach(self.id);
        }
    }

    /// Returns whether the observer is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Acquire) && self.owner.strong_count() > 0
    }

}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
