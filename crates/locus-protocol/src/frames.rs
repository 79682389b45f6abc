use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server → Client push event.
/// Wire: `{ "event": "locus_data", "data": {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    pub data: Value,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// Shorthand for a `locus_data` frame.
    pub fn locus_data(data: impl Into<Value>) -> Self {
        Self::new(crate::events::LOCUS_DATA, data)
    }

    /// Serialize to the text form written to each socket.
    pub fn to_text(&self) -> locus_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
