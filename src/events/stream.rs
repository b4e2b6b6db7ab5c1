use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::error::{EngineError, EngineResult};

use super::bus::BusInner;
use super::types::{SubscriptionId, TriggerChangedEvent};

/// A subscription stream for trigger-changed events.
///
/// Dropping this stream unregisters it from the bus.
#[derive(Debug)]
pub struct TriggerStream {
    subscription_id: SubscriptionId,
    rx: Receiver<TriggerChangedEvent>,
    bus: Weak<BusInner>,
    unregistered: AtomicBool,
}

impl TriggerStream {
    pub(crate) fn new(
        subscription_id: SubscriptionId,
        rx: Receiver<TriggerChangedEvent>,
        bus: Weak<BusInner>,
    ) -> Self {
        Self {
            subscription_id,
            rx,
            bus,
            unregistered: AtomicBool::new(false),
        }
    }

    /// The subscription id backing this stream.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    /// Explicit unregistration. Idempotent.
    ///
    /// Events already buffered can still be received afterwards.
    pub fn unsubscribe(&self) {
        if self.unregistered.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.subscription_id);
        }
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> EngineResult<TriggerChangedEvent> {
        self.rx.recv().map_err(|_| EngineError::Disconnected {
            path: "trigger_stream".to_string(),
        })
    }

    /// Receive the next event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> EngineResult<TriggerChangedEvent> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => EngineError::Timeout {
                duration_ms: timeout.as_millis().min(u128::from(u64::MAX)) as u64,
            },
            RecvTimeoutError::Disconnected => EngineError::Disconnected {
                path: "trigger_stream".to_string(),
            },
        })
    }

    /// Receive a buffered event without waiting. `Ok(None)` when empty.
    pub fn try_recv(&self) -> EngineResult<Option<TriggerChangedEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EngineError::Disconnected {
                path: "trigger_stream".to_string(),
            }),
        }
    }
}

impl Drop for TriggerStream {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
