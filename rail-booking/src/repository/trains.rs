//! `Trains` rows
//!
//! Functions take a plain `&Connection` so callers can compose them inside
//! one ledger transaction.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;

use crate::error::{RailError, RailResult};
use crate::models::{EntityKey, Train, TrainStatus};

pub fn find(conn: &Connection, key: EntityKey) -> RailResult<Option<Train>> {
    let train = conn
        .query_row(
            "SELECT train_id, capacity, status FROM Trains WHERE train_id = ?1",
            params![key],
            |row| {
                Ok(Train {
                    key: row.get(0)?,
                    capacity: row.get(1)?,
                    status: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(train)
}

pub fn require(conn: &Connection, key: EntityKey) -> RailResult<Train> {
    find(conn, key)?.ok_or_else(|| RailError::NotFound("train does not exist".to_string()))
}

/// Insert a train, letting the ledger pick the key when `key` is `None`
pub fn insert(
    conn: &Connection,
    key: Option<EntityKey>,
    capacity: u32,
    status: TrainStatus,
) -> RailResult<EntityKey> {
    match key {
        Some(key) => {
            if find(conn, key)?.is_some() {
                return Err(RailError::AlreadyExists(format!("train {} already exists", key)));
            }
            conn.execute(
                "INSERT INTO Trains (train_id, capacity, status) VALUES (?1, ?2, ?3)",
                params![key, capacity, status],
            )?;
            Ok(key)
        }
        None => {
            conn.execute(
                "INSERT INTO Trains (capacity, status) VALUES (?1, ?2)",
                params![capacity, status],
            )?;
            Ok(EntityKey::new(conn.last_insert_rowid()))
        }
    }
}

pub fn set_capacity(conn: &Connection, key: EntityKey, capacity: u32) -> RailResult<()> {
    conn.execute(
        "UPDATE Trains SET capacity = ?1 WHERE train_id = ?2",
        params![capacity, key],
    )?;
    Ok(())
}

pub fn set_status(conn: &Connection, key: EntityKey, status: TrainStatus) -> RailResult<()> {
    conn.execute(
        "UPDATE Trains SET status = ?1 WHERE train_id = ?2",
        params![status, key],
    )?;
    Ok(())
}

/// Take one seat: a compare-and-decrement that only succeeds while
/// capacity is positive
pub fn reserve_seat(conn: &Connection, key: EntityKey) -> RailResult<()> {
    let updated = conn.execute(
        "UPDATE Trains SET capacity = capacity - 1 WHERE train_id = ?1 AND capacity > 0",
        params![key],
    )?;

    if updated == 0 {
        return Err(RailError::CapacityExceeded(
            "no seats available for reservation".to_string(),
        ));
    }
    Ok(())
}

/// Give one seat back; returns false when the train row is gone
pub fn release_seat(conn: &Connection, key: EntityKey) -> RailResult<bool> {
    let updated = conn.execute(
        "UPDATE Trains SET capacity = capacity + 1 WHERE train_id = ?1",
        params![key],
    )?;
    Ok(updated > 0)
}

pub fn delete(conn: &Connection, key: EntityKey) -> RailResult<usize> {
    Ok(conn.execute("DELETE FROM Trains WHERE train_id = ?1", params![key])?)
}

pub fn all_keys(conn: &Connection) -> RailResult<HashSet<EntityKey>> {
    let mut stmt = conn.prepare("SELECT train_id FROM Trains")?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<EntityKey>, _>>()?;
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SqliteLedger;

    #[test]
    fn test_insert_with_and_without_key() {
        let ledger = SqliteLedger::in_memory().unwrap();

        ledger
            .transaction(|tx| {
                let explicit = insert(tx, Some(EntityKey::new(40)), 10, TrainStatus::Operational)?;
                assert_eq!(explicit, EntityKey::new(40));

                let generated = insert(tx, None, 5, TrainStatus::Delayed)?;
                assert_ne!(generated, explicit);

                let train = require(tx, generated)?;
                assert_eq!(train.capacity, 5);
                assert_eq!(train.status, TrainStatus::Delayed);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_insert_duplicate_key() {
        let ledger = SqliteLedger::in_memory().unwrap();

        let result = ledger.transaction(|tx| {
            insert(tx, Some(EntityKey::new(1)), 10, TrainStatus::Operational)?;
            insert(tx, Some(EntityKey::new(1)), 10, TrainStatus::Operational)
        });
        assert!(matches!(result, Err(RailError::AlreadyExists(_))));
    }

    #[test]
    fn test_reserve_seat_stops_at_zero() {
        let ledger = SqliteLedger::in_memory().unwrap();

        ledger
            .transaction(|tx| {
                let key = insert(tx, None, 1, TrainStatus::Operational)?;
                reserve_seat(tx, key)?;
                assert_eq!(require(tx, key)?.capacity, 0);

                assert!(matches!(reserve_seat(tx, key), Err(RailError::CapacityExceeded(_))));
                assert_eq!(require(tx, key)?.capacity, 0);

                assert!(release_seat(tx, key)?);
                assert_eq!(require(tx, key)?.capacity, 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_release_seat_on_missing_train() {
        let ledger = SqliteLedger::in_memory().unwrap();

        let released = ledger
            .with_connection(|conn| release_seat(conn, EntityKey::new(99)))
            .unwrap();
        assert!(!released);
    }
}
