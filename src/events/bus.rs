//! Trigger event bus.
//!
//! Owns the subscriber set and publishes `TriggerChangedEvent`s to it. The
//! subscriber lock is held only to register, remove, or snapshot subscribers.
//! Handlers are invoked after the lock is released, so a handler that mutates
//! the value store or the subscriber set cannot deadlock the bus.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{bounded, Sender, TrySendError};
use tracing::{debug, warn};

use super::stream::TriggerStream;
use super::types::{SubscriptionId, TriggerChangedEvent, TriggerHandler};

const DEFAULT_STREAM_CAPACITY: usize = 1024;

#[derive(Clone)]
enum Subscriber {
    Handler(Arc<dyn TriggerHandler>),
    Stream(Sender<TriggerChangedEvent>),
}

pub(crate) struct BusInner {
    // Registration order is delivery order.
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    dropped_events: AtomicU64,
    stream_capacity: usize,
}

impl BusInner {
    fn subscribers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Subscriber)>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }
}

/// Publish/subscribe hub for trigger-changed events.
///
/// Cloning the bus yields another handle to the same subscriber set.
#[derive(Clone)]
pub struct TriggerEventBus {
    inner: Arc<BusInner>,
}

impl TriggerEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_stream_capacity(DEFAULT_STREAM_CAPACITY)
    }

    /// Create a bus whose streams buffer up to `capacity` events each.
    #[must_use]
    pub fn with_stream_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(Vec::new()),
                dropped_events: AtomicU64::new(0),
                stream_capacity: capacity.max(1),
            }),
        }
    }

    /// Register a handler. It stays registered until unsubscribed.
    pub fn subscribe(&self, handler: Arc<dyn TriggerHandler>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.inner.subscribers().push((id, Subscriber::Handler(handler)));
        debug!(subscription = %id, "trigger handler subscribed");
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.inner.remove(id);
        if removed {
            debug!(subscription = %id, "trigger subscription removed");
        }
        removed
    }

    /// Register a bounded stream. Dropping the stream unsubscribes it.
    #[must_use]
    pub fn subscribe_stream(&self) -> TriggerStream {
        self.subscribe_stream_with_capacity(self.inner.stream_capacity)
    }

    /// Register a stream buffering up to `capacity` events, overriding the
    /// bus default.
    #[must_use]
    pub fn subscribe_stream_with_capacity(&self, capacity: usize) -> TriggerStream {
        let id = SubscriptionId::new();
        let (tx, rx) = bounded::<TriggerChangedEvent>(capacity.max(1));
        self.inner.subscribers().push((id, Subscriber::Stream(tx)));
        debug!(subscription = %id, "trigger stream subscribed");
        TriggerStream::new(id, rx, Arc::downgrade(&self.inner))
    }

    /// Deliver `event` to every current subscriber.
    ///
    /// Streams never block the publisher: a full or disconnected stream
    /// drops the event and bumps `dropped_events`.
    pub fn publish(&self, event: &TriggerChangedEvent) {
        let targets: Vec<Subscriber> = self
            .inner
            .subscribers()
            .iter()
            .map(|(_, sub)| sub.clone())
            .collect();

        debug!(key = %event.key, cause = ?event.cause, subscribers = targets.len(), "publishing trigger change");

        for target in targets {
            match target {
                Subscriber::Handler(handler) => handler.on_trigger_changed(event),
                Subscriber::Stream(tx) => match tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(key = %event.key, "trigger stream full, event dropped");
                        self.inner.dropped_events.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        self.inner.dropped_events.fetch_add(1, Ordering::Relaxed);
                    }
                },
            }
        }
    }

    /// Number of registered handlers and streams.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.subscribers().len()
    }

    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.inner.dropped_events.load(Ordering::Relaxed)
    }
}

impl Default for TriggerEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TriggerEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerEventBus")
            .field("subscribers", &self.handler_count())
            .field("dropped_events", &self.dropped_events())
            .field("stream_capacity", &self.inner.stream_capacity)
            .finish()
    }
}
