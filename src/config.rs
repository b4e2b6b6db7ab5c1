//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Trigger engine configuration.
///
/// Deserializes with defaults for any missing field, so it can be embedded
/// in a host's JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-stream buffer capacity for `subscribe_stream`.
    pub stream_capacity: usize,
    /// Publish a `Removed` trigger-changed event when a property is removed.
    pub publish_removals: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stream_capacity: 1024,
            publish_removals: false,
        }
    }
}

impl EngineConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, crate::error::ParseError> {
        Ok(serde_json::from_str(s)?)
    }
}
