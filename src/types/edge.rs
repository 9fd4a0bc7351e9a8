use super::graphid::Graphid;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Edge (Relationship) in the graph
///
/// Represents a directed edge with:
/// - Unique identifier (Graphid)
/// - Start vertex ID
/// - End vertex ID
/// - Label (type of the edge, e.g. "CONNECTION")
/// - Properties (arbitrary JSON data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    /// Unique identifier
    pub id: Graphid,

    /// Start vertex ID (source)
    pub start: Graphid,

    /// End vertex ID (target)
    pub end: Graphid,

    /// Edge label
    pub label: String,

    /// Properties stored as JSON
    pub properties: JsonValue,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        id: Graphid,
        start: Graphid,
        end: Graphid,
        label: impl Into<String>,
        properties: JsonValue,
    ) -> Self {
        Self {
            id,
            start,
            end,
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

    /// Numeric property widened to f64
    pub fn f64_property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(JsonValue::as_f64)
    }

    /// Check if this edge is a self-loop
    pub fn is_self_loop(&self) -> bool {
        self.start == self.end
    }

    /// True when the edge runs from `start` to `end` in that direction
    pub fn connects(&self, start: Graphid, end: Graphid) -> bool {
        self.start == start && self.end == end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_creation() {
        let id = Graphid::new(2, 200).unwrap();
        let start = Graphid::new(1, 100).unwrap();
        let end = Graphid::new(1, 101).unwrap();

        let properties = json!({"travel_time": 30, "price": 15.0});
        let edge = Edge::new(id, start, end, "CONNECTION", properties);

        assert_eq!(edge.start, start);
        assert_eq!(edge.end, end);
        assert_eq!(edge.label, "CONNECTION");
        assert_eq!(edge.i64_property("travel_time"), Some(30));
        assert_eq!(edge.f64_property("price"), Some(15.0));
        assert_eq!(edge.f64_property("travel_time"), Some(30.0));
    }

    #[test]
    fn test_edge_direction() {
        let id = Graphid::new(2, 1).unwrap();
        let a = Graphid::new(1, 1).unwrap();
        let b = Graphid::new(1, 2).unwrap();

        let edge = Edge::new(id, a, b, "CONNECTION", json!({}));
        assert!(edge.connects(a, b));
        assert!(!edge.connects(b, a));
        assert!(!edge.is_self_loop());

        let looped = Edge::new(id, a, a, "CONNECTION", json!({}));
        assert!(looped.is_self_loop());
    }

    #[test]
    fn test_edge_serialization() {
        let id = Graphid::new(2, 200).unwrap();
        let start = Graphid::new(1, 100).unwrap();
        let end = Graphid::new(1, 101).unwrap();
        let edge = Edge::new(id, start, end, "Has_Stops", json!({}));

        let serialized = serde_json::to_string(&edge).unwrap();
        let deserialized: Edge = serde_json::from_str(&serialized).unwrap();

        assert_eq!(edge, deserialized);
    }
}
