//! Trigger definitions.
//!
//! A trigger is one leaf condition of a message's display rule. Triggers are
//! owned by the message definition and are read-only to the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::value::TriggerValue;

/// What decides whether a trigger holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Resolved from the local property store by name.
    Custom,
    /// Time elapsed in the current session.
    SessionTime,
    /// Time elapsed since the last in-app message was shown.
    #[serde(alias = "min_time_since")]
    TimeSinceLastInApp,
    /// Anything this engine does not recognize. Never fires.
    #[serde(other)]
    Unknown,
}

impl TriggerKind {
    /// True for kinds whose truth is computed by the dynamic evaluator.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        !matches!(self, Self::Custom | Self::Unknown)
    }
}

/// Comparison operators supported by triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerOperator {
    #[serde(rename = "equal", alias = "==")]
    EqualTo,
    #[serde(rename = "not_equal", alias = "!=")]
    NotEqualTo,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessThanOrEqualTo,
    #[serde(rename = ">=")]
    GreaterThanOrEqualTo,
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "not_exists")]
    NotExists,
    #[serde(rename = "in")]
    Contains,
}

impl TriggerOperator {
    /// Every operator, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::EqualTo,
        Self::NotEqualTo,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanOrEqualTo,
        Self::GreaterThanOrEqualTo,
        Self::Exists,
        Self::NotExists,
        Self::Contains,
    ];

    /// Parse an operator from its wire form.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "equal" | "==" => Ok(Self::EqualTo),
            "not_equal" | "!=" => Ok(Self::NotEqualTo),
            "<" => Ok(Self::LessThan),
            ">" => Ok(Self::GreaterThan),
            "<=" => Ok(Self::LessThanOrEqualTo),
            ">=" => Ok(Self::GreaterThanOrEqualTo),
            "exists" => Ok(Self::Exists),
            "not_exists" => Ok(Self::NotExists),
            "in" => Ok(Self::Contains),
            other => Err(ParseError::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }

    /// `EQUAL_TO` and `NOT_EQUAL_TO`.
    #[must_use]
    pub const fn checks_equality(self) -> bool {
        matches!(self, Self::EqualTo | Self::NotEqualTo)
    }

    /// The four ordering comparisons.
    #[must_use]
    pub const fn is_relational(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::GreaterThan | Self::LessThanOrEqualTo | Self::GreaterThanOrEqualTo
        )
    }
}

impl fmt::Display for TriggerOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EqualTo => "==",
            Self::NotEqualTo => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqualTo => "<=",
            Self::GreaterThanOrEqualTo => ">=",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
            Self::Contains => "in",
        };
        f.write_str(s)
    }
}

/// A single leaf condition of a message's trigger tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Stable id used for redisplay change matching.
    #[serde(rename = "id", default)]
    pub trigger_id: String,
    pub kind: TriggerKind,
    /// Property looked up in the value store (custom triggers).
    #[serde(default)]
    pub property: String,
    #[serde(rename = "operator")]
    pub operator: TriggerOperator,
    /// Expected operand; `None` when the definition carries no value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<TriggerValue>,
}

impl Trigger {
    /// Creates a custom trigger. The property name doubles as its id.
    #[must_use]
    pub fn custom(
        property: impl Into<String>,
        operator: TriggerOperator,
        value: Option<TriggerValue>,
    ) -> Self {
        let property = property.into();
        Self {
            trigger_id: property.clone(),
            kind: TriggerKind::Custom,
            property,
            operator,
            value,
        }
    }

    /// Creates a trigger resolved by the dynamic evaluator.
    #[must_use]
    pub fn dynamic(
        kind: TriggerKind,
        trigger_id: impl Into<String>,
        operator: TriggerOperator,
        value: Option<TriggerValue>,
    ) -> Self {
        Self {
            trigger_id: trigger_id.into(),
            kind,
            property: String::new(),
            operator,
            value,
        }
    }

    /// Replaces the trigger id.
    #[must_use]
    pub fn with_id(mut self, trigger_id: impl Into<String>) -> Self {
        self.trigger_id = trigger_id.into();
        self
    }

    /// Decode a trigger from its JSON definition.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ParseError> {
        let obj = json.as_object().ok_or(ParseError::InvalidShape {
            field: "trigger".to_string(),
            expected: "an object",
        })?;

        for field in ["kind", "operator"] {
            if !obj.contains_key(field) {
                return Err(ParseError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        // Give unknown operators a precise error instead of serde's variant list.
        if let Some(op) = obj.get("operator").and_then(serde_json::Value::as_str) {
            TriggerOperator::parse(op)?;
        }

        let mut fields = obj.clone();
        let value = match fields.remove("value") {
            Some(v) => TriggerValue::from_json(&v)?,
            None => None,
        };

        let mut trigger: Self = serde_json::from_value(serde_json::Value::Object(fields))?;
        trigger.value = value;
        Ok(trigger)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TriggerKind::Custom => write!(f, "{} {}", self.property, self.operator)?,
            kind => write!(f, "{kind:?}({}) {}", self.trigger_id, self.operator)?,
        }
        if let Some(v) = &self.value {
            write!(f, " {v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_all_forms() {
        assert_eq!(TriggerOperator::parse("equal").unwrap(), TriggerOperator::EqualTo);
        assert_eq!(TriggerOperator::parse("==").unwrap(), TriggerOperator::EqualTo);
        assert_eq!(TriggerOperator::parse("not_equal").unwrap(), TriggerOperator::NotEqualTo);
        assert_eq!(TriggerOperator::parse("!=").unwrap(), TriggerOperator::NotEqualTo);
        assert_eq!(TriggerOperator::parse("<=").unwrap(), TriggerOperator::LessThanOrEqualTo);
        assert_eq!(TriggerOperator::parse("in").unwrap(), TriggerOperator::Contains);
        assert_eq!(TriggerOperator::parse("not_exists").unwrap(), TriggerOperator::NotExists);
        assert!(matches!(
            TriggerOperator::parse("~="),
            Err(ParseError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_operator_display_round_trips_through_parse() {
        for op in TriggerOperator::ALL {
            assert_eq!(TriggerOperator::parse(&op.to_string()).unwrap(), op);
        }
    }

    #[test]
    fn test_operator_classes() {
        assert!(TriggerOperator::EqualTo.checks_equality());
        assert!(!TriggerOperator::EqualTo.is_relational());
        assert!(TriggerOperator::GreaterThanOrEqualTo.is_relational());
        assert!(!TriggerOperator::Contains.checks_equality());
        assert!(!TriggerOperator::Exists.is_relational());
    }

    #[test]
    fn test_kind_is_dynamic() {
        assert!(!TriggerKind::Custom.is_dynamic());
        assert!(!TriggerKind::Unknown.is_dynamic());
        assert!(TriggerKind::SessionTime.is_dynamic());
        assert!(TriggerKind::TimeSinceLastInApp.is_dynamic());
    }

    #[test]
    fn test_trigger_from_json() {
        let json = serde_json::json!({
            "id": "t1",
            "kind": "custom",
            "property": "level",
            "operator": ">=",
            "value": 3
        });
        let trigger = Trigger::from_json(&json).unwrap();
        assert_eq!(trigger.trigger_id, "t1");
        assert_eq!(trigger.kind, TriggerKind::Custom);
        assert_eq!(trigger.property, "level");
        assert_eq!(trigger.operator, TriggerOperator::GreaterThanOrEqualTo);
        assert_eq!(trigger.value, Some(TriggerValue::Number(3.0)));
    }

    #[test]
    fn test_trigger_from_json_unknown_kind() {
        let json = serde_json::json!({
            "id": "t2",
            "kind": "location",
            "operator": "exists"
        });
        let trigger = Trigger::from_json(&json).unwrap();
        assert_eq!(trigger.kind, TriggerKind::Unknown);
        assert!(trigger.value.is_none());
    }

    #[test]
    fn test_trigger_from_json_dynamic_alias() {
        let json = serde_json::json!({
            "id": "t3",
            "kind": "min_time_since",
            "operator": ">",
            "value": 30
        });
        let trigger = Trigger::from_json(&json).unwrap();
        assert_eq!(trigger.kind, TriggerKind::TimeSinceLastInApp);
    }

    #[test]
    fn test_trigger_from_json_errors() {
        let missing = serde_json::json!({ "kind": "custom", "property": "p" });
        assert_eq!(
            Trigger::from_json(&missing).unwrap_err(),
            ParseError::MissingField {
                field: "operator".to_string()
            }
        );

        let bad_op = serde_json::json!({ "kind": "custom", "operator": "like" });
        assert!(matches!(
            Trigger::from_json(&bad_op),
            Err(ParseError::UnknownOperator { .. })
        ));

        let bad_value = serde_json::json!({
            "kind": "custom",
            "operator": "equal",
            "value": { "nested": true }
        });
        assert!(matches!(
            Trigger::from_json(&bad_value),
            Err(ParseError::UnsupportedValue { .. })
        ));

        assert!(matches!(
            Trigger::from_json(&serde_json::json!("custom")),
            Err(ParseError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_custom_builder_uses_property_as_id() {
        let t = Trigger::custom("plan", TriggerOperator::EqualTo, Some("pro".into()));
        assert_eq!(t.trigger_id, "plan");
        assert_eq!(t.to_string(), "plan == \"pro\"");

        let t = t.with_id("abc");
        assert_eq!(t.trigger_id, "abc");
    }
}
