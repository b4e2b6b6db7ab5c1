//! Trigger engine.
//!
//! Ties together the value store, the dynamic evaluator and the event bus.
//! The model store pushes property changes in through [`ModelChangeObserver`];
//! a message-selection component asks whether a message should display now;
//! a redisplay scheduler subscribes to trigger-changed events.
//!
//! All operations run synchronously on the calling thread.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::dynamic::{DynamicTriggerEvaluator, StaticDynamicTriggers};
use crate::evaluator::TriggerEvaluator;
use crate::events::{
    ChangeCause, SubscriptionId, TriggerChangedEvent, TriggerEventBus, TriggerHandler, TriggerStream,
};
use crate::message::InAppMessage;
use crate::model::ModelChangeObserver;
use crate::redisplay;
use crate::store::TriggerValueStore;
use crate::value::TriggerValue;

/// Decides whether in-app messages should display given current triggers.
pub struct TriggerEngine {
    store: TriggerValueStore,
    dynamic: Arc<dyn DynamicTriggerEvaluator>,
    config: EngineConfig,
}

impl TriggerEngine {
    /// Create an engine with default configuration.
    pub fn new(dynamic: Arc<dyn DynamicTriggerEvaluator>) -> Self {
        Self::with_config(dynamic, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(dynamic: Arc<dyn DynamicTriggerEvaluator>, config: EngineConfig) -> Self {
        Self {
            store: TriggerValueStore::new(),
            dynamic,
            config,
        }
    }

    /// Create an engine backed by an in-process [`StaticDynamicTriggers`].
    ///
    /// The evaluator's bus streams use `config.stream_capacity`. The evaluator
    /// is returned too so the host can flip dynamic triggers.
    pub fn in_process(config: EngineConfig) -> (Self, Arc<StaticDynamicTriggers>) {
        let bus = TriggerEventBus::with_stream_capacity(config.stream_capacity);
        let dynamic = Arc::new(StaticDynamicTriggers::with_events(bus));
        let engine = Self::with_config(Arc::clone(&dynamic) as Arc<dyn DynamicTriggerEvaluator>, config);
        (engine, dynamic)
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The local property value store.
    #[must_use]
    pub const fn store(&self) -> &TriggerValueStore {
        &self.store
    }

    fn evaluator(&self) -> TriggerEvaluator<'_> {
        TriggerEvaluator::new(&self.store, self.dynamic.as_ref())
    }

    /// Whether `message` should display right now.
    #[must_use]
    pub fn evaluate_message_triggers(&self, message: &InAppMessage) -> bool {
        let result = self.evaluator().evaluate_tree(&message.triggers);
        debug!(message_id = %message.message_id, result, "message triggers evaluated");
        result
    }

    /// Per-trigger results for `message`, group by group.
    #[must_use]
    pub fn explain(&self, message: &InAppMessage) -> Vec<Vec<bool>> {
        self.evaluator().explain(&message.triggers)
    }

    /// Whether any of `changed_keys` names a trigger of `message`.
    #[must_use]
    pub fn is_trigger_on_message<S: AsRef<str>>(&self, message: &InAppMessage, changed_keys: &[S]) -> bool {
        redisplay::is_trigger_on_message(&message.triggers, changed_keys)
    }

    /// Whether `message` depends only on dynamic triggers.
    #[must_use]
    pub fn message_has_only_dynamic_triggers(&self, message: &InAppMessage) -> bool {
        redisplay::message_has_only_dynamic_triggers(&message.triggers)
    }

    /// Store `value` under `key` and notify subscribers that `key` changed.
    pub fn add_triggers(&self, key: impl Into<String>, value: TriggerValue) {
        let key = key.into();
        let cause = match self.store.set(key.clone(), value) {
            Some(_) => ChangeCause::Updated,
            None => ChangeCause::Added,
        };
        self.publish(key, cause);
    }

    /// Store several values, publishing one event per key.
    pub fn add_triggers_batch<K, I>(&self, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TriggerValue)>,
    {
        for (key, value) in values {
            self.add_triggers(key, value);
        }
    }

    /// Remove the values stored under `keys`.
    ///
    /// Removal publishes nothing unless `publish_removals` is configured.
    pub fn remove_triggers_for_keys<S: AsRef<str>>(&self, keys: &[S]) {
        for key in keys {
            let key = key.as_ref();
            let removed = self.store.remove(key).is_some();
            if removed && self.config.publish_removals {
                self.publish(key.to_string(), ChangeCause::Removed);
            }
        }
    }

    // Called with no store lock held.
    fn publish(&self, key: String, cause: ChangeCause) {
        self.dynamic.events().publish(&TriggerChangedEvent::new(key, cause));
    }

    /// Register a trigger-changed handler on the dynamic evaluator's bus.
    pub fn subscribe(&self, handler: Arc<dyn TriggerHandler>) -> SubscriptionId {
        self.dynamic.events().subscribe(handler)
    }

    /// Remove a handler registered with [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.dynamic.events().unsubscribe(id)
    }

    /// Receive trigger-changed events through a channel holding up to
    /// `stream_capacity` events.
    #[must_use]
    pub fn subscribe_stream(&self) -> TriggerStream {
        self.dynamic
            .events()
            .subscribe_stream_with_capacity(self.config.stream_capacity)
    }
}

impl ModelChangeObserver for TriggerEngine {
    fn on_added(&self, key: &str, value: TriggerValue) {
        self.store.set(key, value);
        self.publish(key.to_string(), ChangeCause::Added);
    }

    fn on_updated(
        &self,
        key: &str,
        property: &str,
        _old_value: Option<TriggerValue>,
        new_value: TriggerValue,
    ) {
        debug!(key, property, "trigger model updated");
        self.store.set(key, new_value);
        self.publish(key.to_string(), ChangeCause::Updated);
    }

    fn on_removed(&self, key: &str) {
        self.remove_triggers_for_keys(&[key]);
    }
}

impl fmt::Debug for TriggerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerEngine")
            .field("store", &self.store)
            .field("events", self.dynamic.events())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
