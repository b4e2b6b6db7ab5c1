//! Error types for the trigger engine.
//!
//! Evaluation itself never fails: every malformed or mismatched comparison
//! degrades to "does not fire". The types here cover the surfaces around it:
//! decoding message definitions, operator diagnostics, and event streams.

use thiserror::Error;

use crate::trigger::TriggerOperator;

/// Errors that occur while decoding trigger definitions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unknown trigger operator '{operator}'")]
    UnknownOperator {
        operator: String,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Expected {expected} for '{field}'")]
    InvalidShape {
        field: String,
        expected: &'static str,
    },

    #[error("Unsupported trigger value: {reason}")]
    UnsupportedValue {
        reason: String,
    },

    #[error("Malformed trigger definition: {message}")]
    Json {
        message: String,
    },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

/// Diagnostic raised when an operator is applied to operands it cannot compare.
///
/// The evaluator logs these and treats the trigger as not firing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("Operator '{operator}' cannot be used in a {value_type} comparison")]
    InvalidOperator {
        operator: TriggerOperator,
        value_type: &'static str,
    },
}

/// Top-level error type for the trigger engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Event stream disconnected: {path}")]
    Disconnected {
        path: String,
    },

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

impl EngineError {
    /// Returns true if this is a decoding error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true if the other side of a stream has gone away.
    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }

    /// Returns true if waiting for an event timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for trigger engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
