use rail_graph_db::{
    simple_paths_between, GraphStorage, Graphid, PathOptions, VariableLengthPath,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    error::{RailError, RailResult},
    models::{
        station::{CONNECTION_LABEL, STATION_LABEL},
        Connection, EntityKey, Station,
    },
};

/// Stations and the directed connections between them
///
/// Uniqueness checks and the writes they guard run under one lock, so
/// callers sharing a repository cannot both create the same station or edge.
pub struct StationRepository {
    storage: Arc<dyn GraphStorage>,
    writes: Mutex<()>,
}

impl StationRepository {
    pub fn new(storage: Arc<dyn GraphStorage>) -> Self {
        Self {
            storage,
            writes: Mutex::new(()),
        }
    }

    /// Create a station
    pub async fn create_station(
        &self,
        key: EntityKey,
        details: Option<String>,
    ) -> RailResult<Station> {
        let _guard = self.writes.lock().await;

        if self.find_station(key).await?.is_some() {
            return Err(RailError::AlreadyExists(format!("station {} already exists", key)));
        }

        let station = Station::new(key, details);
        let vertex = self
            .storage
            .create_vertex(STATION_LABEL, station.properties())
            .await?;

        Station::from_vertex(&vertex)
    }

    /// Get station by key
    pub async fn find_station(&self, key: EntityKey) -> RailResult<Option<Station>> {
        let vertices = self.storage.scan_vertices(STATION_LABEL).await?;

        for vertex in vertices {
            if vertex.matches(STATION_LABEL, "station_id", key.to_int()) {
                return Ok(Some(Station::from_vertex(&vertex)?));
            }
        }

        Ok(None)
    }

    pub async fn require_station(&self, key: EntityKey) -> RailResult<Station> {
        self.find_station(key)
            .await?
            .ok_or_else(|| RailError::NotFound(format!("station {} does not exist", key)))
    }

    pub async fn list_stations(&self) -> RailResult<Vec<Station>> {
        self.storage
            .scan_vertices(STATION_LABEL)
            .await?
            .iter()
            .map(Station::from_vertex)
            .collect()
    }

    /// Graph id to station key, for every station
    pub async fn station_keys(&self) -> RailResult<HashMap<Graphid, EntityKey>> {
        Ok(self
            .list_stations()
            .await?
            .into_iter()
            .filter_map(|s| s.id.map(|id| (id, s.key)))
            .collect())
    }

    /// The directed connection `from -> to`, if any
    pub async fn find_connection(
        &self,
        from: &Station,
        to: &Station,
    ) -> RailResult<Option<Connection>> {
        let (Some(from_id), Some(to_id)) = (from.id, to.id) else {
            return Ok(None);
        };

        let outgoing = self.storage.get_outgoing_edges(from_id).await?;
        outgoing
            .iter()
            .find(|e| e.label == CONNECTION_LABEL && e.connects(from_id, to_id))
            .map(Connection::from_edge)
            .transpose()
    }

    /// Connect two stored stations
    pub async fn create_connection(
        &self,
        from: &Station,
        to: &Station,
        travel_time: u32,
    ) -> RailResult<Connection> {
        let (Some(from_id), Some(to_id)) = (from.id, to.id) else {
            return Err(RailError::NotFound("station is not stored".to_string()));
        };

        let _guard = self.writes.lock().await;

        if self.find_connection(from, to).await?.is_some() {
            return Err(RailError::AlreadyExists(format!(
                "stations {} and {} are already connected",
                from.key, to.key
            )));
        }

        let edge = self
            .storage
            .create_edge(CONNECTION_LABEL, from_id, to_id, Connection::properties(travel_time))
            .await?;

        Connection::from_edge(&edge)
    }

    /// Every connection keyed by its (from, to) station keys
    pub async fn connections_by_stations(
        &self,
    ) -> RailResult<HashMap<(EntityKey, EntityKey), Connection>> {
        let keys = self.station_keys().await?;
        let mut connections = HashMap::new();

        for edge in self.storage.scan_edges(CONNECTION_LABEL).await? {
            let connection = Connection::from_edge(&edge)?;
            let endpoints = (keys.get(&connection.from), keys.get(&connection.to));
            if let (Some(&from), Some(&to)) = endpoints {
                connections.insert((from, to), connection);
            }
        }

        Ok(connections)
    }

    /// Simple connection paths between two stored stations
    pub async fn paths_between(
        &self,
        from: &Station,
        to: &Station,
        max_hops: usize,
    ) -> RailResult<Vec<VariableLengthPath>> {
        let (Some(from_id), Some(to_id)) = (from.id, to.id) else {
            return Ok(Vec::new());
        };

        let options = PathOptions {
            max_length: max_hops,
            ..PathOptions::new(CONNECTION_LABEL)
        };

        Ok(simple_paths_between(self.storage.clone(), from_id, to_id, &options).await?)
    }
}
