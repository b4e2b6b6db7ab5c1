//! Message trigger trees.
//!
//! A message's display condition is an OR of AND-groups. The outer sequence
//! is OR'd, each inner sequence is AND'd. An empty tree always holds.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::trigger::Trigger;

/// OR of AND-groups of triggers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerTree {
    groups: Vec<Vec<Trigger>>,
}

impl TriggerTree {
    /// A tree with no triggers: the message displays immediately.
    #[must_use]
    pub const fn empty() -> Self {
        Self { groups: Vec::new() }
    }

    #[must_use]
    pub fn new(groups: Vec<Vec<Trigger>>) -> Self {
        Self { groups }
    }

    /// A tree holding exactly one AND-group.
    #[must_use]
    pub fn all_of(triggers: Vec<Trigger>) -> Self {
        Self {
            groups: vec![triggers],
        }
    }

    /// Appends an AND-group, OR'd with the existing ones.
    #[must_use]
    pub fn or(mut self, group: Vec<Trigger>) -> Self {
        self.groups.push(group);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn groups(&self) -> &[Vec<Trigger>] {
        &self.groups
    }

    /// Every leaf trigger, group by group.
    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.groups.iter().flatten()
    }

    /// Decode a tree from a JSON array of arrays of trigger objects.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ParseError> {
        let outer = json.as_array().ok_or(ParseError::InvalidShape {
            field: "triggers".to_string(),
            expected: "an array of trigger groups",
        })?;

        let mut groups = Vec::with_capacity(outer.len());
        for group in outer {
            let inner = group.as_array().ok_or(ParseError::InvalidShape {
                field: "triggers[]".to_string(),
                expected: "an array of triggers",
            })?;
            let triggers = inner
                .iter()
                .map(Trigger::from_json)
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(triggers);
        }

        Ok(Self { groups })
    }
}

/// The part of an in-app message definition this engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InAppMessage {
    #[serde(rename = "id")]
    pub message_id: String,
    #[serde(default)]
    pub triggers: TriggerTree,
}

impl InAppMessage {
    #[must_use]
    pub fn new(message_id: impl Into<String>, triggers: TriggerTree) -> Self {
        Self {
            message_id: message_id.into(),
            triggers,
        }
    }

    /// Decode the `id` and `triggers` fields of a message definition.
    ///
    /// A missing `triggers` field yields an empty tree.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ParseError> {
        let obj = json.as_object().ok_or(ParseError::InvalidShape {
            field: "message".to_string(),
            expected: "an object",
        })?;

        let message_id = obj
            .get("id")
            .and_then(serde_json::Value::as_str)
            .ok_or(ParseError::MissingField {
                field: "id".to_string(),
            })?
            .to_string();

        let triggers = match obj.get("triggers") {
            Some(t) => TriggerTree::from_json(t)?,
            None => TriggerTree::empty(),
        };

        Ok(Self { message_id, triggers })
    }
}
