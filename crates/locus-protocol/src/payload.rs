use locus_core::{LocusError, Result};
use serde_json::{Map, Value};

/// Untyped key/value data relayed as-is.
pub type Payload = Map<String, Value>;

/// Parse an ingress body. Only a JSON object is accepted.
pub fn parse_object(body: &[u8]) -> Result<Payload> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| LocusError::InvalidPayload(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LocusError::PayloadNotObject {
            kind: kind_of(&other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
