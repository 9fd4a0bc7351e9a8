use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RailError;

/// Identifier shared by trains and stations across both stores
///
/// The integer form is what both stores persist; the string form is its
/// decimal rendering, so each converts to the other without loss.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(i64);

impl EntityKey {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn to_int(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityKey {
    type Err = RailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| RailError::InvalidArgument(format!("'{}' is not a valid key", s)))
    }
}

impl From<i64> for EntityKey {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<EntityKey> for i64 {
    fn from(key: EntityKey) -> i64 {
        key.0
    }
}

impl ToSql for EntityKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for EntityKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}
