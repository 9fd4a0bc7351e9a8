use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::EntityKey;
use crate::error::RailError;

/// Operating status persisted as 0, 1 or 2 in `Trains.status`
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TrainStatus {
    Operational,
    Delayed,
    Broken,
}

impl TryFrom<i64> for TrainStatus {
    type Error = RailError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TrainStatus::Operational),
            1 => Ok(TrainStatus::Delayed),
            2 => Ok(TrainStatus::Broken),
            other => Err(RailError::InvalidArgument(format!(
                "invalid train status {}",
                other
            ))),
        }
    }
}

impl From<TrainStatus> for i64 {
    fn from(status: TrainStatus) -> i64 {
        match status {
            TrainStatus::Operational => 0,
            TrainStatus::Delayed => 1,
            TrainStatus::Broken => 2,
        }
    }
}

impl ToSql for TrainStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(*self)))
    }
}

impl FromSql for TrainStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        TrainStatus::try_from(raw).map_err(|_| FromSqlError::OutOfRange(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub key: EntityKey,
    pub capacity: u32,
    pub status: TrainStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_raw_value() {
        for status in [TrainStatus::Operational, TrainStatus::Delayed, TrainStatus::Broken] {
            assert_eq!(TrainStatus::try_from(i64::from(status)).unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        for raw in [-1, 3, 99] {
            assert!(matches!(
                TrainStatus::try_from(raw),
                Err(RailError::InvalidArgument(_))
            ));
        }
    }
}
