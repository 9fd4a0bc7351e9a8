/// Transaction implementation for RocksDB storage
///
/// Writes are buffered and applied through a single RocksDB `WriteBatch` on
/// commit.

use super::error::{StorageError, StorageResult};
use super::ids::IdAllocator;
use super::keys::Keyspace;
use super::GraphTransaction;
use crate::types::{Edge, Graphid, Vertex};
use async_trait::async_trait;
use rocksdb::{WriteBatch, DB};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Write operation for batching
#[derive(Debug, Clone)]
enum WriteOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Active,
    Committed,
    RolledBack,
}

/// RocksDB transaction using WriteBatch
pub struct RocksDbTransaction {
    db: Arc<DB>,
    keys: Keyspace,
    ids: Arc<IdAllocator>,

    /// Batched write operations, in submission order
    operations: Vec<WriteOp>,

    /// Edges created in this transaction, so a later delete can find them
    pending_edges: HashMap<Graphid, Edge>,

    state: TxState,
}

impl RocksDbTransaction {
    pub(crate) fn new(db: Arc<DB>, keys: Keyspace, ids: Arc<IdAllocator>) -> Self {
        Self {
            db,
            keys,
            ids,
            operations: Vec::new(),
            pending_edges: HashMap::new(),
            state: TxState::Active,
        }
    }

    fn check_state(&self) -> StorageResult<()> {
        match self.state {
            TxState::Active => Ok(()),
            TxState::Committed => Err(StorageError::TransactionError(
                "Transaction already committed".into(),
            )),
            TxState::RolledBack => Err(StorageError::TransactionError(
                "Transaction already rolled back".into(),
            )),
        }
    }

    fn put(&mut self, key: String, value: Vec<u8>) {
        self.operations.push(WriteOp::Put {
            key: key.into_bytes(),
            value,
        });
    }

    fn delete(&mut self, key: String) {
        self.operations.push(WriteOp::Delete {
            key: key.into_bytes(),
        });
    }

    fn committed_edge(&self, id: Graphid) -> StorageResult<Option<Edge>> {
        match self.db.get(self.keys.edge_key(id).as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl GraphTransaction for RocksDbTransaction {
    async fn create_vertex(
        &mut self,
        label: &str,
        properties: JsonValue,
    ) -> StorageResult<Vertex> {
        self.check_state()?;

        let id = self.ids.allocate(label)?;
        let vertex = Vertex::new(id, label, properties);

        let value = serde_json::to_vec(&vertex)?;
        self.put(self.keys.vertex_key(id), value);

        Ok(vertex)
    }

    async fn create_edge(
        &mut self,
        label: &str,
        start: Graphid,
        end: Graphid,
        properties: JsonValue,
    ) -> StorageResult<Edge> {
        self.check_state()?;

        let id = self.ids.allocate(label)?;
        let edge = Edge::new(id, start, end, label, properties);

        let value = serde_json::to_vec(&edge)?;
        self.put(self.keys.edge_key(id), value);
        self.put(self.keys.outgoing_key(start, id), Vec::new());
        self.put(self.keys.incoming_key(end, id), Vec::new());

        self.pending_edges.insert(id, edge.clone());

        Ok(edge)
    }

    async fn delete_vertex(&mut self, id: Graphid) -> StorageResult<()> {
        self.check_state()?;

        self.delete(self.keys.vertex_key(id));

        Ok(())
    }

    async fn delete_edge(&mut self, id: Graphid) -> StorageResult<()> {
        self.check_state()?;

        let edge = match self.pending_edges.remove(&id) {
            Some(edge) => Some(edge),
            None => self.committed_edge(id)?,
        };

        // An edge that does not exist is a no-op, matching a zero-row delete
        if let Some(edge) = edge {
            self.delete(self.keys.edge_key(id));
            self.delete(self.keys.outgoing_key(edge.start, id));
            self.delete(self.keys.incoming_key(edge.end, id));
        }

        Ok(())
    }

    async fn commit(&mut self) -> StorageResult<()> {
        self.check_state()?;

        let mut batch = WriteBatch::default();
        for op in self.operations.drain(..) {
            match op {
                WriteOp::Put { key, value } => batch.put(key, value),
                WriteOp::Delete { key } => batch.delete(key),
            }
        }

        // Commit the batch atomically
        self.db.write(batch)?;

        self.pending_edges.clear();
        self.state = TxState::Committed;
        Ok(())
    }

    async fn rollback(&mut self) -> StorageResult<()> {
        self.check_state()?;

        self.operations.clear();
        self.pending_edges.clear();
        self.state = TxState::RolledBack;

        Ok(())
    }
}
