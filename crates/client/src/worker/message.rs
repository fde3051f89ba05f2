//! Control messages posted to the worker by the page.

use serde::{Deserialize, Serialize};

/// A message with a recognized `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ControlMessage {
    /// Fetch the data assets and store them for offline use.
    #[serde(rename = "cacheData")]
    CacheData,
    #[serde(other)]
    Unknown,
}

impl ControlMessage {
    /// Interpret arbitrary message data; anything unrecognized is `Unknown`.
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self::deserialize(value).unwrap_or(Self::Unknown)
    }
}
