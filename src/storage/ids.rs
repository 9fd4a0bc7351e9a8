/// Label and local-id allocation
///
/// One allocator is shared by a `RocksDbStorage` and every transaction it
/// begins, so ids handed out to concurrent writers never collide. Allocated
/// ids are persisted immediately; a rolled-back transaction leaves a gap.

use super::error::{StorageError, StorageResult};
use super::keys::{decode_u16, decode_u64, Keyspace};
use crate::types::Graphid;
use parking_lot::Mutex;
use rocksdb::DB;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct LabelTable {
    by_name: HashMap<String, u16>,
    next_id: u16,
}

pub struct IdAllocator {
    db: Arc<DB>,
    keys: Keyspace,
    labels: Mutex<LabelTable>,
    counters: Mutex<()>,
}

impl IdAllocator {
    /// Build the allocator and load the labels already stored for the graph
    pub fn load(db: Arc<DB>, keys: Keyspace) -> StorageResult<Self> {
        let mut table = LabelTable {
            next_id: 1,
            ..LabelTable::default()
        };

        let prefix = keys.label_prefix();
        for item in db.prefix_iterator(prefix.as_bytes()) {
            let (key, value) = item?;
            let key_str = std::str::from_utf8(&key)?;

            let Some(label_name) = key_str.strip_prefix(&prefix) else {
                break;
            };
            let label_id = decode_u16(&value)?;

            table.by_name.insert(label_name.to_string(), label_id);
            if label_id >= table.next_id {
                table.next_id = label_id
                    .checked_add(1)
                    .ok_or_else(|| StorageError::CounterOverflow(label_name.to_string()))?;
            }
        }

        Ok(Self {
            db,
            keys,
            labels: Mutex::new(table),
            counters: Mutex::new(()),
        })
    }

    /// Label ID if the label has been used before
    pub fn label_id(&self, label: &str) -> Option<u16> {
        self.labels.lock().by_name.get(label).copied()
    }

    /// Get or create a label ID
    pub fn get_or_create_label(&self, label: &str) -> StorageResult<u16> {
        let mut table = self.labels.lock();
        if let Some(&label_id) = table.by_name.get(label) {
            return Ok(label_id);
        }

        let label_id = table.next_id;
        table.next_id = label_id
            .checked_add(1)
            .ok_or_else(|| StorageError::CounterOverflow(label.to_string()))?;

        self.db
            .put(self.keys.label_key(label).as_bytes(), label_id.to_le_bytes())?;

        table.by_name.insert(label.to_string(), label_id);
        tracing::debug!(label, label_id, "registered graph label");

        Ok(label_id)
    }

    /// Allocate the next local ID for a label
    fn next_local_id(&self, label: &str) -> StorageResult<u64> {
        let _guard = self.counters.lock();
        let key = self.keys.counter_key(label);

        let current = match self.db.get(key.as_bytes())? {
            Some(bytes) => decode_u64(&bytes)?,
            None => 0,
        };

        let next = current
            .checked_add(1)
            .filter(|next| *next <= Graphid::MAX_LOCID)
            .ok_or_else(|| StorageError::CounterOverflow(label.to_string()))?;

        self.db.put(key.as_bytes(), next.to_le_bytes())?;

        Ok(next)
    }

    /// Allocate a fresh Graphid under `label`
    pub fn allocate(&self, label: &str) -> StorageResult<Graphid> {
        let label_id = self.get_or_create_label(label)?;
        let locid = self.next_local_id(label)?;
        Graphid::new(label_id, locid).map_err(|e| StorageError::InvalidState(e.to_string()))
    }
}
