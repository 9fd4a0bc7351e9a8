use super::graphid::Graphid;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Vertex (Node) in the graph
///
/// Represents a graph vertex with:
/// - Unique identifier (Graphid)
/// - Label (type of the vertex, e.g. "Station" or "Schedule")
/// - Properties (arbitrary JSON data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vertex {
    /// Unique identifier
    pub id: Graphid,

    /// Vertex label
    pub label: String,

    /// Properties stored as JSON
    pub properties: JsonValue,
}

impl Vertex {
    /// Create a new vertex
    pub fn new(id: Graphid, label: impl Into<String>, properties: JsonValue) -> Self {
        Self {
            id,
            label: label.into(),
            properties,
        }
    }

    /// Get a property value by key
    pub fn get_property(&self, key: &str) -> Option<&JsonValue> {
        self.properties.get(key)
    }

    /// Integer property, `None` when absent or not an integer
    pub fn i64_property(&self, key: &str) -> Option<i64> {
        self.properties.get(key).and_then(JsonValue::as_i64)
    }

    /// String property, `None` when absent or not a string
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(JsonValue::as_str)
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: JsonValue) {
        if let JsonValue::Object(ref mut map) = self.properties {
            map.insert(key.into(), value);
        }
    }

    /// True when the vertex carries `label` and its integer property `key`
    /// equals `value`
    pub fn matches(&self, label: &str, key: &str, value: i64) -> bool {
        self.label == label && self.i64_property(key) == Some(value)
    }
}
