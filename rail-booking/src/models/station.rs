use rail_graph_db::{Edge, Graphid, Vertex};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::EntityKey;
use crate::error::{RailError, RailResult};

pub const STATION_LABEL: &str = "Station";
pub const CONNECTION_LABEL: &str = "CONNECTION";

/// Graph node `Station{station_id, details}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Graphid>,
    #[serde(rename = "station_id")]
    pub key: EntityKey,
    pub details: Option<String>,
}

impl Station {
    pub fn new(key: EntityKey, details: Option<String>) -> Self {
        Self {
            id: None,
            key,
            details,
        }
    }

    pub fn from_vertex(vertex: &Vertex) -> RailResult<Self> {
        let mut station: Station = serde_json::from_value(vertex.properties.clone())?;
        station.id = Some(vertex.id);
        Ok(station)
    }

    pub fn properties(&self) -> serde_json::Value {
        json!({
            "station_id": self.key.to_int(),
            "details": self.details,
        })
    }
}

/// Directed `CONNECTION{travel_time, price}` edge between two stations
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: Graphid,
    pub from: Graphid,
    pub to: Graphid,
    /// Minutes, 1 to 60
    pub travel_time: u32,
    pub price: f64,
}

impl Connection {
    pub const MIN_TRAVEL_TIME: u32 = 1;
    pub const MAX_TRAVEL_TIME: u32 = 60;

    pub fn price_for(travel_time: u32) -> f64 {
        travel_time as f64 / 2.0
    }

    pub fn properties(travel_time: u32) -> serde_json::Value {
        json!({
            "travel_time": travel_time,
            "price": Self::price_for(travel_time),
        })
    }

    pub fn from_edge(edge: &Edge) -> RailResult<Self> {
        let travel_time = edge
            .i64_property("travel_time")
            .and_then(|t| u32::try_from(t).ok())
            .ok_or_else(|| {
                RailError::Internal(format!("connection {} has no travel_time", edge.id))
            })?;
        let price = edge
            .f64_property("price")
            .unwrap_or_else(|| Self::price_for(travel_time));

        Ok(Self {
            id: edge.id,
            from: edge.start,
            to: edge.end,
            travel_time,
            price,
        })
    }
}
