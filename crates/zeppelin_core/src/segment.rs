use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One piece of paragraph output: a content type such as `TEXT`, `HTML` or
/// `TABLE`, and its payload.
///
/// The type is fixed at construction; the payload can grow when output
/// arrives in several chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSegment {
    #[serde(rename = "type")]
    kind: String,
    data: String,
}

impl ResultSegment {
    pub fn new(kind: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: data.into(),
        }
    }

    /// Build from a `{"type": .., "data": ..}` message; missing fields become empty.
    pub fn from_json(message: &Value) -> Self {
        Self::new(string_field(message, "type"), string_field(message, "data"))
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn append_data(&mut self, chunk: &str) {
        self.data.push_str(chunk);
    }
}

impl fmt::Display for ResultSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Result{{type='{}', data='{}'}}", self.kind, self.data)
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
