/// Relational ledger backed by SQLite
///
/// Holds trains, users, tickets and purchase history. One connection is
/// shared behind a mutex; `transaction` opens an IMMEDIATE transaction so the
/// write lock is taken before the first read.

pub mod schema;

use parking_lot::Mutex;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;

use crate::error::RailResult;

pub const IN_MEMORY: &str = ":memory:";

pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open (or create) the ledger at `path` and bootstrap its schema
    pub fn open<P: AsRef<Path>>(path: P) -> RailResult<Self> {
        let path = path.as_ref();
        let conn = if path == Path::new(IN_MEMORY) {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| crate::error::RailError::Unavailable(e.to_string()))?;
            }
            let conn = Connection::open(path)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn
        };

        let ledger = Self {
            conn: Mutex::new(conn),
        };
        ledger.initialize()?;

        tracing::debug!(path = %path.display(), "opened ledger");
        Ok(ledger)
    }

    pub fn in_memory() -> RailResult<Self> {
        Self::open(IN_MEMORY)
    }

    /// Run the schema bootstrap statements
    pub fn initialize(&self) -> RailResult<()> {
        let conn = self.conn.lock();
        for statement in schema::initialization_statements() {
            conn.execute_batch(statement)?;
        }
        Ok(())
    }

    /// Run `f` against the connection outside any explicit transaction
    pub fn with_connection<T, F>(&self, f: F) -> RailResult<T>
    where
        F: FnOnce(&Connection) -> RailResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside one IMMEDIATE transaction
    ///
    /// Commits when `f` returns `Ok`; any error drops the transaction, which
    /// rolls every statement back.
    pub fn transaction<T, F>(&self, f: F) -> RailResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> RailResult<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
