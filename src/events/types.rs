//! Event and handler types for trigger-changed notifications.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a subscription.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a trigger-changed event was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    /// A property was stored for the first time.
    Added,
    /// An existing property got a new value.
    Updated,
    /// A property was removed. Only published when enabled in config.
    Removed,
    /// A dynamic trigger changed state.
    Dynamic,
}

/// A fired trigger-changed notification.
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerChangedEvent {
    pub event_id: Uuid,
    /// Property name or dynamic trigger id that changed.
    pub key: String,
    pub cause: ChangeCause,
    pub timestamp: DateTime<Utc>,
}

impl TriggerChangedEvent {
    #[must_use]
    pub fn new(key: impl Into<String>, cause: ChangeCause) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            key: key.into(),
            cause,
            timestamp: Utc::now(),
        }
    }
}

/// Receives trigger-changed notifications.
///
/// Handlers run on the publishing thread. They may subscribe or unsubscribe
/// other handlers; such changes apply from the next publication.
pub trait TriggerHandler: Send + Sync {
    /// Called once per published event.
    fn on_trigger_changed(&self, event: &TriggerChangedEvent);
}

impl<F> TriggerHandler for F
where
    F: Fn(&TriggerChangedEvent) + Send + Sync,
{
    fn on_trigger_changed(&self, event: &TriggerChangedEvent) {
        self(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_carries_key_and_cause() {
        let ev = TriggerChangedEvent::new("level", ChangeCause::Updated);
        assert_eq!(ev.key, "level");
        assert_eq!(ev.cause, ChangeCause::Updated);
        assert_ne!(ev.event_id, TriggerChangedEvent::new("level", ChangeCause::Updated).event_id);
    }

    #[test]
    fn event_serializes_cause_in_snake_case() {
        let ev = TriggerChangedEvent::new("k", ChangeCause::Dynamic);
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["cause"], "dynamic");
        assert_eq!(json["key"], "k");
    }

    #[test]
    fn closures_are_handlers() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = AtomicUsize::new(0);
        let handler = |_: &TriggerChangedEvent| {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        handler.on_trigger_changed(&TriggerChangedEvent::new("k", ChangeCause::Added));
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }
}
