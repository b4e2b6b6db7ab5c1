//! Model-store change notifications.
//!
//! The host's model store owns trigger values and pushes every mutation to
//! the engine. Delivery contract expected from the store: at least once per
//! logical mutation, in mutation order for any one key, with no ordering
//! promised across keys. Repeated delivery is harmless because applying the
//! same value twice leaves the store unchanged.

use serde::{Deserialize, Serialize};

use crate::value::TriggerValue;

/// One mutation reported by the model store.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelChange {
    Added {
        key: String,
        value: TriggerValue,
    },
    Updated {
        key: String,
        /// Name of the model field that changed.
        property: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old_value: Option<TriggerValue>,
        new_value: TriggerValue,
    },
    Removed {
        key: String,
    },
}

impl ModelChange {
    /// The trigger key this change applies to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Added { key, .. } | Self::Updated { key, .. } | Self::Removed { key } => key,
        }
    }
}

/// Observer interface implemented by whatever consumes model-store changes.
pub trait ModelChangeObserver: Send + Sync {
    /// A trigger value was stored for the first time.
    fn on_added(&self, key: &str, value: TriggerValue);

    /// A stored trigger value changed.
    fn on_updated(
        &self,
        key: &str,
        property: &str,
        old_value: Option<TriggerValue>,
        new_value: TriggerValue,
    );

    /// A trigger value was removed.
    fn on_removed(&self, key: &str);

    /// Route a `ModelChange` to the matching callback.
    fn apply(&self, change: ModelChange) {
        match change {
            ModelChange::Added { key, value } => self.on_added(&key, value),
            ModelChange::Updated {
                key,
                property,
                old_value,
                new_value,
            } => self.on_updated(&key, &property, old_value, new_value),
            ModelChange::Removed { key } => self.on_removed(&key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_key() {
        assert_eq!(ModelChange::Removed { key: "k".into() }.key(), "k");
        assert_eq!(
            ModelChange::Added {
                key: "a".into(),
                value: 1.into()
            }
            .key(),
            "a"
        );
    }

    #[test]
    fn change_deserializes_from_tagged_json() {
        let json = serde_json::json!({
            "type": "updated",
            "key": "level",
            "property": "value",
            "new_value": 4
        });
        let change: ModelChange = serde_json::from_value(json).unwrap();
        assert_eq!(
            change,
            ModelChange::Updated {
                key: "level".into(),
                property: "value".into(),
                old_value: None,
                new_value: TriggerValue::Number(4.0),
            }
        );
    }
}
