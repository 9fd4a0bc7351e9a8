/// Key space layout shared by the storage and its transactions
///
/// - Vertex:   v:{graph}:{label}:{locid} → JSON
/// - Edge:     e:{graph}:{label}:{locid} → JSON
/// - OutEdge:  o:{graph}:{src_vid}:{eid} → empty
/// - InEdge:   i:{graph}:{dst_vid}:{eid} → empty
/// - Label:    l:{graph}:{name} → labid (u16 LE)
/// - Counter:  c:{graph}:{label} → max_locid (u64 LE)

use super::error::{StorageError, StorageResult};
use crate::types::Graphid;

#[derive(Debug, Clone)]
pub struct Keyspace {
    graph_name: String,
}

impl Keyspace {
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
        }
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    pub fn label_prefix(&self) -> String {
        format!("l:{}:", self.graph_name)
    }

    pub fn label_key(&self, label: &str) -> String {
        format!("l:{}:{}", self.graph_name, label)
    }

    pub fn counter_key(&self, label: &str) -> String {
        format!("c:{}:{}", self.graph_name, label)
    }

    pub fn vertex_key(&self, id: Graphid) -> String {
        format!("v:{}:{}:{}", self.graph_name, id.labid(), id.locid())
    }

    pub fn vertex_prefix(&self, label_id: u16) -> String {
        format!("v:{}:{}:", self.graph_name, label_id)
    }

    pub fn edge_key(&self, id: Graphid) -> String {
        format!("e:{}:{}:{}", self.graph_name, id.labid(), id.locid())
    }

    pub fn edge_prefix(&self, label_id: u16) -> String {
        format!("e:{}:{}:", self.graph_name, label_id)
    }

    pub fn outgoing_key(&self, src: Graphid, eid: Graphid) -> String {
        format!("o:{}:{}:{}", self.graph_name, src.as_raw(), eid.as_raw())
    }

    pub fn outgoing_prefix(&self, src: Graphid) -> String {
        format!("o:{}:{}:", self.graph_name, src.as_raw())
    }

    pub fn incoming_key(&self, dst: Graphid, eid: Graphid) -> String {
        format!("i:{}:{}:{}", self.graph_name, dst.as_raw(), eid.as_raw())
    }

    pub fn incoming_prefix(&self, dst: Graphid) -> String {
        format!("i:{}:{}:", self.graph_name, dst.as_raw())
    }
}

/// Extract the edge id from an `o:` or `i:` index key
pub fn edge_id_from_index_key(key: &str) -> StorageResult<Graphid> {
    let raw = key
        .rsplit(':')
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| {
            StorageError::InvalidState(format!("Invalid edge ID in index key {}", key))
        })?;
    Ok(Graphid::from_raw(raw))
}

pub fn decode_u16(bytes: &[u8]) -> StorageResult<u16> {
    let array: [u8; 2] = bytes
        .get(..2)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| StorageError::InvalidState("Truncated label id".into()))?;
    Ok(u16::from_le_bytes(array))
}

pub fn decode_u64(bytes: &[u8]) -> StorageResult<u64> {
    let array: [u8; 8] = bytes
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| StorageError::InvalidState("Truncated counter".into()))?;
    Ok(u64::from_le_bytes(array))
}
