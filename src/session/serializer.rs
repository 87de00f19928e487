use serde_json::Value;

use super::attributes::Attributes;
use crate::SessionError;

/// Converts session attributes to and from the string a driver stores.
///
/// Implementations must round-trip nested maps and scalars losslessly.
pub trait Serializer: Send + Sync {
    fn serialize(&self, attributes: &Attributes) -> Result<String, SessionError>;

    fn deserialize(&self, data: &str) -> Result<Attributes, SessionError>;
}

/// Stores attributes as a JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, attributes: &Attributes) -> Result<String, SessionError> {
        serde_json::to_string(attributes)
            .map_err(|e| SessionError::Serialization(format!("Failed to serialize session: {e}")))
    }

    fn deserialize(&self, data: &str) -> Result<Attributes, SessionError> {
        match serde_json::from_str(data) {
            Ok(Value::Object(attributes)) => Ok(attributes),
            Ok(other) => Err(SessionError::Serialization(format!(
                "Session data must be a JSON object, got {}",
                json_type(&other)
            ))),
            Err(e) => Err(SessionError::Serialization(format!(
                "Failed to parse session data: {e}"
            ))),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
