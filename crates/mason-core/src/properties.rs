//! Property bags: the value model shared by brick instances and plan output.
//!
//! Brick properties arrive from the definition boundary as strongly typed
//! values, not opaque strings. Plan units and shared services reuse the same
//! model for their target-specific configuration keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A property value. The subset of JSON the boundary accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Render a scalar as configuration text.
    ///
    /// Field values arrive as strings or integers depending on how the
    /// boundary JSON was written; target runtimes take configuration as
    /// text either way. Structured values have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Short type name for diagnostics ("string", "integer", ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A bag of named property values. Insertion order is preserved.
pub type Properties = IndexMap<String, Value>;

/// Extension trait for building Properties ergonomically.
pub trait PropertiesExt {
    fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self;
}

impl PropertiesExt for Properties {
    fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let props = Properties::new()
            .with("port", "8080")
            .with("retries", 3i64)
            .with("secure", true);

        assert_eq!(props.get("port").and_then(Value::as_str), Some("8080"));
        assert_eq!(props.get("retries").and_then(Value::as_i64), Some(3));
        assert_eq!(props.get("secure").and_then(Value::as_bool), Some(true));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::from(1i64).type_name(), "integer");
        assert_eq!(Value::from(vec!["a", "b"]).type_name(), "array");
    }

    #[test]
    fn test_to_text_renders_scalars() {
        assert_eq!(Value::from("8080").to_text().as_deref(), Some("8080"));
        assert_eq!(Value::from(8080i64).to_text().as_deref(), Some("8080"));
        assert_eq!(Value::from(true).to_text().as_deref(), Some("true"));
        assert_eq!(Value::from(vec!["a"]).to_text(), None);
    }

    #[test]
    fn test_untagged_deserialization() {
        let props: Properties =
            serde_json::from_str(r#"{"path": "/data", "port": 8080, "tags": ["a"]}"#).unwrap();

        assert_eq!(props.get("path").and_then(Value::as_str), Some("/data"));
        assert_eq!(props.get("port").and_then(Value::as_i64), Some(8080));
        assert!(props.get("tags").and_then(Value::as_array).is_some());
    }
}
