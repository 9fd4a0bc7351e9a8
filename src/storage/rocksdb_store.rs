/// RocksDB storage implementation
///
/// See `keys.rs` for the key space layout.

use super::error::{StorageError, StorageResult};
use super::ids::IdAllocator;
use super::keys::{edge_id_from_index_key, Keyspace};
use super::transaction::RocksDbTransaction;
use super::{GraphStorage, GraphTransaction};
use crate::types::{Edge, Graphid, Vertex};
use async_trait::async_trait;
use rocksdb::{Options, DB};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;

/// RocksDB-backed graph storage
pub struct RocksDbStorage {
    /// RocksDB database instance
    db: Arc<DB>,

    /// Key builders for this graph's namespace
    keys: Keyspace,

    /// Label and local-id allocation, shared with transactions
    ids: Arc<IdAllocator>,
}

impl RocksDbStorage {
    /// Create a new RocksDB storage instance
    ///
    /// # Arguments
    /// * `path` - Path to the database directory
    /// * `graph_name` - Name of the graph (namespace)
    pub fn new<P: AsRef<Path>>(path: P, graph_name: impl Into<String>) -> StorageResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let db = Arc::new(DB::open(&opts, path)?);
        let keys = Keyspace::new(graph_name);
        let ids = Arc::new(IdAllocator::load(db.clone(), keys.clone())?);

        tracing::debug!(graph = keys.graph_name(), "opened graph storage");

        Ok(Self { db, keys, ids })
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, prefix: &str) -> StorageResult<Vec<T>> {
        let mut items = Vec::new();

        for item in self.db.prefix_iterator(prefix.as_bytes()) {
            let (key, value) = item?;
            let key_str = std::str::from_utf8(&key)?;

            // Check if key still matches prefix
            if !key_str.starts_with(prefix) {
                break;
            }

            items.push(serde_json::from_slice(&value)?);
        }

        Ok(items)
    }

    async fn adjacent_edges(&self, prefix: String) -> StorageResult<Vec<Edge>> {
        let mut edge_ids = Vec::new();

        for item in self.db.prefix_iterator(prefix.as_bytes()) {
            let (key, _value) = item?;
            let key_str = std::str::from_utf8(&key)?;

            if !key_str.starts_with(&prefix) {
                break;
            }

            edge_ids.push(edge_id_from_index_key(key_str)?);
        }

        let mut edges = Vec::with_capacity(edge_ids.len());
        for eid in edge_ids {
            if let Some(edge) = self.get_edge(eid).await? {
                edges.push(edge);
            }
        }

        Ok(edges)
    }
}

#[async_trait]
impl GraphStorage for RocksDbStorage {
    async fn get_vertex(&self, id: Graphid) -> StorageResult<Option<Vertex>> {
        self.read(&self.keys.vertex_key(id))
    }

    async fn get_edge(&self, id: Graphid) -> StorageResult<Option<Edge>> {
        self.read(&self.keys.edge_key(id))
    }

    async fn create_vertex(&self, label: &str, properties: JsonValue) -> StorageResult<Vertex> {
        let id = self.ids.allocate(label)?;
        let vertex = Vertex::new(id, label, properties);

        self.db
            .put(self.keys.vertex_key(id).as_bytes(), serde_json::to_vec(&vertex)?)?;

        Ok(vertex)
    }

    async fn create_edge(
        &self,
        label: &str,
        start: Graphid,
        end: Graphid,
        properties: JsonValue,
    ) -> StorageResult<Edge> {
        let id = self.ids.allocate(label)?;
        let edge = Edge::new(id, start, end, label, properties);

        let mut batch = rocksdb::WriteBatch::default();
        batch.put(self.keys.edge_key(id).as_bytes(), serde_json::to_vec(&edge)?);
        batch.put(self.keys.outgoing_key(start, id).as_bytes(), b"");
        batch.put(self.keys.incoming_key(end, id).as_bytes(), b"");
        self.db.write(batch)?;

        Ok(edge)
    }

    async fn delete_vertex(&self, id: Graphid) -> StorageResult<()> {
        // Check for connected edges
        let outgoing = self.get_outgoing_edges(id).await?;
        let incoming = self.get_incoming_edges(id).await?;
        let total_edges = outgoing.len() + incoming.len();

        if total_edges > 0 {
            return Err(StorageError::VertexHasEdges(id.to_string(), total_edges));
        }

        self.db.delete(self.keys.vertex_key(id).as_bytes())?;

        Ok(())
    }

    async fn delete_edge(&self, id: Graphid) -> StorageResult<()> {
        let edge = self
            .get_edge(id)
            .await?
            .ok_or_else(|| StorageError::EdgeNotFound(id.to_string()))?;

        let mut batch = rocksdb::WriteBatch::default();
        batch.delete(self.keys.edge_key(id).as_bytes());
        batch.delete(self.keys.outgoing_key(edge.start, id).as_bytes());
        batch.delete(self.keys.incoming_key(edge.end, id).as_bytes());
        self.db.write(batch)?;

        Ok(())
    }

    async fn scan_vertices(&self, label: &str) -> StorageResult<Vec<Vertex>> {
        match self.ids.label_id(label) {
            Some(label_id) => self.scan(&self.keys.vertex_prefix(label_id)),
            None => Ok(Vec::new()),
        }
    }

    async fn scan_edges(&self, label: &str) -> StorageResult<Vec<Edge>> {
        match self.ids.label_id(label) {
            Some(label_id) => self.scan(&self.keys.edge_prefix(label_id)),
            None => Ok(Vec::new()),
        }
    }

    async fn get_outgoing_edges(&self, vid: Graphid) -> StorageResult<Vec<Edge>> {
        self.adjacent_edges(self.keys.outgoing_prefix(vid)).await
    }

    async fn get_incoming_edges(&self, vid: Graphid) -> StorageResult<Vec<Edge>> {
        self.adjacent_edges(self.keys.incoming_prefix(vid)).await
    }

    async fn begin_transaction(&self) -> StorageResult<Box<dyn GraphTransaction>> {
        Ok(Box::new(RocksDbTransaction::new(
            self.db.clone(),
            self.keys.clone(),
            self.ids.clone(),
        )))
    }
}
