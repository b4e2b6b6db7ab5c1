//! Operator matching for custom triggers.
//!
//! Compares a trigger's expected operand against a stored property value.
//! Same-type comparisons (string/string, number/number) are tried first. If
//! they do not produce a match, flexible coercion gets a chance: equality
//! operators compare canonical string forms, relational operators parse a
//! stored string as a number when the operand is numeric.
//!
//! Nothing here fails hard. Operators that make no sense for the operand
//! types produce a `MatchError`, which [`operator_matches`] logs and turns
//! into `false`.

use tracing::warn;

use crate::error::MatchError;
use crate::trigger::TriggerOperator;
use crate::value::{format_decimal, TriggerValue};

/// Decide whether `stored` satisfies `operator` against `expected`.
///
/// Invalid operator/type combinations are logged and evaluate to `false`.
#[must_use]
pub fn operator_matches(
    operator: TriggerOperator,
    expected: Option<&TriggerValue>,
    stored: &TriggerValue,
) -> bool {
    match try_match(operator, expected, stored) {
        Ok(matched) => matched,
        Err(err) => {
            warn!(error = %err, stored = %stored, "trigger comparison rejected");
            false
        }
    }
}

/// Like [`operator_matches`] but returns the diagnostic instead of logging it.
///
/// `Err` is only returned when no comparison path produced a match.
pub fn try_match(
    operator: TriggerOperator,
    expected: Option<&TriggerValue>,
    stored: &TriggerValue,
) -> Result<bool, MatchError> {
    match operator {
        TriggerOperator::Exists => return Ok(true),
        TriggerOperator::NotExists => return Ok(false),
        // Only collections can contain anything; other types never match.
        TriggerOperator::Contains => {
            return Ok(match (stored, expected) {
                (TriggerValue::List(items), Some(e)) => items.contains(e),
                _ => false,
            });
        }
        _ => {}
    }

    let mut diagnostic = None;

    let direct = match (expected, stored) {
        (Some(TriggerValue::String(e)), TriggerValue::String(s)) => {
            Some(compare_strings(operator, e, s))
        }
        (Some(TriggerValue::Number(e)), TriggerValue::Number(s)) => {
            Some(compare_numbers(operator, *e, *s))
        }
        _ => None,
    };
    match direct {
        Some(Ok(true)) => return Ok(true),
        Some(Err(err)) => diagnostic = Some(err),
        Some(Ok(false)) | None => {}
    }

    if flex_matches(operator, expected, stored) {
        return Ok(true);
    }

    diagnostic.map_or(Ok(false), Err)
}

/// String comparison. Only equality operators are meaningful.
pub fn compare_strings(
    operator: TriggerOperator,
    expected: &str,
    stored: &str,
) -> Result<bool, MatchError> {
    match operator {
        TriggerOperator::EqualTo => Ok(expected == stored),
        TriggerOperator::NotEqualTo => Ok(expected != stored),
        operator => Err(MatchError::InvalidOperator {
            operator,
            value_type: "string",
        }),
    }
}

/// Numeric comparison of the stored value against the expected operand.
#[allow(clippy::float_cmp)]
pub fn compare_numbers(
    operator: TriggerOperator,
    expected: f64,
    stored: f64,
) -> Result<bool, MatchError> {
    match operator {
        TriggerOperator::EqualTo => Ok(stored == expected),
        TriggerOperator::NotEqualTo => Ok(stored != expected),
        TriggerOperator::LessThan => Ok(stored < expected),
        TriggerOperator::GreaterThan => Ok(stored > expected),
        TriggerOperator::LessThanOrEqualTo => {
            Ok(stored < expected || doubles_equal(stored, expected))
        }
        TriggerOperator::GreaterThanOrEqualTo => {
            Ok(stored > expected || doubles_equal(stored, expected))
        }
        operator @ (TriggerOperator::Exists
        | TriggerOperator::NotExists
        | TriggerOperator::Contains) => Err(MatchError::InvalidOperator {
            operator,
            value_type: "numeric",
        }),
    }
}

fn doubles_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < f64::EPSILON
}

fn flex_matches(
    operator: TriggerOperator,
    expected: Option<&TriggerValue>,
    stored: &TriggerValue,
) -> bool {
    let Some(expected) = expected else {
        return false;
    };

    if operator.checks_equality() {
        let (Some(e), Some(s)) = (
            canonical_against(expected, stored),
            canonical_against(stored, expected),
        ) else {
            return false;
        };
        return compare_strings(operator, &e, &s).unwrap_or(false);
    }

    match (expected, stored) {
        (TriggerValue::Number(e), TriggerValue::String(s)) => parse_number(s)
            .and_then(|d| compare_numbers(operator, *e, d).ok())
            .unwrap_or(false),
        _ => false,
    }
}

// A numeric string compared with a number takes the number's canonical form,
// so "5.0" lines up with 5.
fn canonical_against(value: &TriggerValue, other: &TriggerValue) -> Option<String> {
    match (value, other) {
        (TriggerValue::String(s), TriggerValue::Number(_)) => {
            Some(parse_number(s).map_or_else(|| s.clone(), format_decimal))
        }
        _ => value.canonical_string(),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}
