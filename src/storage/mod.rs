/// Storage engine abstraction for the graph database
///
/// This module provides the core storage interface and implementations:
/// - GraphStorage trait: Abstract storage operations
/// - RocksDB implementation: Production storage backend
/// - Transaction support: writes grouped into one atomic batch

pub mod error;
mod ids;
mod keys;
pub mod rocksdb_store;
pub mod transaction;

use crate::types::{Edge, Graphid, Vertex};
use async_trait::async_trait;
pub use error::{StorageError, StorageResult};
use serde_json::Value as JsonValue;

/// Graph storage abstraction
///
/// Implementations must provide:
/// - Vertex operations (get, create, delete, scan)
/// - Edge operations (get, create, delete, scan)
/// - Relationship queries (outgoing/incoming edges)
/// - Transaction support
#[async_trait]
pub trait GraphStorage: Send + Sync {
    /// Get a vertex by ID
    ///
    /// # Returns
    /// * `Ok(Some(vertex))` if found
    /// * `Ok(None)` if not found
    /// * `Err(StorageError)` on storage errors
    async fn get_vertex(&self, id: Graphid) -> StorageResult<Option<Vertex>>;

    /// Get an edge by ID
    async fn get_edge(&self, id: Graphid) -> StorageResult<Option<Edge>>;

    /// Create a new vertex with an assigned ID
    async fn create_vertex(&self, label: &str, properties: JsonValue) -> StorageResult<Vertex>;

    /// Create a new directed edge from `start` to `end`
    async fn create_edge(
        &self,
        label: &str,
        start: Graphid,
        end: Graphid,
        properties: JsonValue,
    ) -> StorageResult<Edge>;

    /// Delete a vertex
    ///
    /// Fails with `StorageError::VertexHasEdges` while edges still reference it.
    async fn delete_vertex(&self, id: Graphid) -> StorageResult<()>;

    /// Delete an edge and its adjacency index entries
    async fn delete_edge(&self, id: Graphid) -> StorageResult<()>;

    /// Scan all vertices with a given label
    ///
    /// A label that was never used yields an empty result.
    async fn scan_vertices(&self, label: &str) -> StorageResult<Vec<Vertex>>;

    /// Scan all edges with a given label
    async fn scan_edges(&self, label: &str) -> StorageResult<Vec<Edge>>;

    /// Get all outgoing edges from a vertex
    async fn get_outgoing_edges(&self, vid: Graphid) -> StorageResult<Vec<Edge>>;

    /// Get all incoming edges to a vertex
    async fn get_incoming_edges(&self, vid: Graphid) -> StorageResult<Vec<Edge>>;

    /// Begin a transaction
    async fn begin_transaction(&self) -> StorageResult<Box<dyn GraphTransaction>>;
}

/// Transaction interface for graph operations
///
/// Writes are buffered until `commit`, which applies them as one atomic batch.
#[async_trait]
pub trait GraphTransaction: Send + Sync {
    /// Create a vertex within this transaction
    async fn create_vertex(&mut self, label: &str, properties: JsonValue)
        -> StorageResult<Vertex>;

    /// Create an edge within this transaction
    async fn create_edge(
        &mut self,
        label: &str,
        start: Graphid,
        end: Graphid,
        properties: JsonValue,
    ) -> StorageResult<Edge>;

    /// Delete a vertex within this transaction
    async fn delete_vertex(&mut self, id: Graphid) -> StorageResult<()>;

    /// Delete an edge within this transaction
    async fn delete_edge(&mut self, id: Graphid) -> StorageResult<()>;

    /// Commit the transaction
    async fn commit(&mut self) -> StorageResult<()>;

    /// Rollback the transaction
    async fn rollback(&mut self) -> StorageResult<()>;
}
