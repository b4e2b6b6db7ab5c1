//! Dynamic trigger evaluation seam.
//!
//! Session- and time-based triggers are decided outside this crate. The
//! engine asks the evaluator whether such a trigger should fire right now and
//! re-exposes the evaluator's event bus as its own subscription surface.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::events::{ChangeCause, TriggerChangedEvent, TriggerEventBus};
use crate::trigger::Trigger;

/// Decides non-custom triggers and owns the trigger-changed event bus.
pub trait DynamicTriggerEvaluator: Send + Sync {
    /// Whether `trigger` holds right now. Must not have side effects.
    fn should_fire(&self, trigger: &Trigger) -> bool;

    /// Bus on which trigger-changed events are published.
    fn events(&self) -> &TriggerEventBus;
}

/// In-process evaluator whose answers are set explicitly per trigger id.
///
/// Useful for embedded hosts that compute session state themselves, and for
/// tests. Unknown ids do not fire.
#[derive(Debug, Default)]
pub struct StaticDynamicTriggers {
    firing: RwLock<HashMap<String, bool>>,
    events: TriggerEventBus,
}

impl StaticDynamicTriggers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing bus, e.g. one configured with a custom stream capacity.
    #[must_use]
    pub fn with_events(events: TriggerEventBus) -> Self {
        Self {
            firing: RwLock::default(),
            events,
        }
    }

    /// Record whether the trigger with `trigger_id` fires.
    ///
    /// Publishes a `Dynamic` trigger-changed event when the state changes.
    pub fn set_firing(&self, trigger_id: impl Into<String>, fires: bool) {
        let trigger_id = trigger_id.into();
        let previous = self
            .firing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(trigger_id.clone(), fires);

        if previous != Some(fires) {
            debug!(trigger_id = %trigger_id, fires, "dynamic trigger changed");
            self.events
                .publish(&TriggerChangedEvent::new(trigger_id, ChangeCause::Dynamic));
        }
    }
}

impl DynamicTriggerEvaluator for StaticDynamicTriggers {
    fn should_fire(&self, trigger: &Trigger) -> bool {
        self.firing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&trigger.trigger_id)
            .copied()
            .unwrap_or(false)
    }

    fn events(&self) -> &TriggerEventBus {
        &self.events
    }
}
