//! Values that device properties and trigger operands can hold.
//!
//! Property values arrive loosely typed from the model store. They are kept
//! as a closed set of variants so the operator matcher can handle every case
//! explicitly. An absent value is represented as `Option::None`, never as a
//! variant of its own.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A dynamically typed property value or trigger operand.
///
/// # Examples
///
/// ```
/// use trigger_engine::TriggerValue;
///
/// let name = TriggerValue::from("premium");
/// let level = TriggerValue::from(5);
/// let tags: TriggerValue = vec!["a", "b"].into_iter().collect();
///
/// assert!(name.is_string());
/// assert_eq!(level.as_number(), Some(5.0));
/// assert!(tags.is_list());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriggerValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<TriggerValue>),
}

impl TriggerValue {
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TriggerValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }

    /// Canonical string form used by flexible equality.
    ///
    /// Numbers keep at most one fractional digit with the trailing zero
    /// dropped, so `5.0` and `5` both become `"5"`. Lists have no canonical
    /// scalar form.
    #[must_use]
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::Number(v) => Some(format_decimal(*v)),
            Self::String(v) => Some(v.clone()),
            Self::List(_) => None,
        }
    }

    /// Decode an operand or property value from JSON.
    ///
    /// `null` decodes to `None` (absent). Objects are rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Option<Self>, ParseError> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(None),
            Json::Bool(v) => Ok(Some(Self::Bool(*v))),
            Json::Number(n) => n.as_f64().map(|v| Some(Self::Number(v))).ok_or_else(|| {
                ParseError::UnsupportedValue {
                    reason: format!("number {n} is not representable as f64"),
                }
            }),
            Json::String(v) => Ok(Some(Self::String(v.clone()))),
            Json::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    // Nulls inside a collection carry no membership information.
                    if let Some(v) = Self::from_json(item)? {
                        out.push(v);
                    }
                }
                Ok(Some(Self::List(out)))
            }
            Json::Object(_) => Err(ParseError::UnsupportedValue {
                reason: "objects cannot be compared by triggers".to_string(),
            }),
        }
    }
}

/// Format a number with at most one fractional digit, trailing zero dropped.
///
/// Rounding is half-to-even at the first decimal place.
#[must_use]
pub fn format_decimal(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    // Past 2^52 every f64 is an integer, and scaling by ten could overflow.
    if v.abs() >= 4_503_599_627_370_496.0 {
        return format!("{v:.0}");
    }
    let rounded = (v * 10.0).round_ties_even() / 10.0;
    if rounded == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

impl std::fmt::Display for TriggerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for TriggerValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for TriggerValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<i64> for TriggerValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<f32> for TriggerValue {
    fn from(v: f32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<f64> for TriggerValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for TriggerValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for TriggerValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<TriggerValue>> for TriggerValue {
    fn from(v: Vec<TriggerValue>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<TriggerValue>> FromIterator<T> for TriggerValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}
