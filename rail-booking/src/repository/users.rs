//! `Users` rows

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{RailError, RailResult};
use crate::models::User;

pub fn find(conn: &Connection, email: &str) -> RailResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT email, user_details FROM Users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    email: row.get(0)?,
                    details: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn require(conn: &Connection, email: &str) -> RailResult<User> {
    find(conn, email)?.ok_or_else(|| RailError::NotFound("user does not exist".to_string()))
}

pub fn insert(conn: &Connection, user: &User) -> RailResult<()> {
    if find(conn, &user.email)?.is_some() {
        return Err(RailError::AlreadyExists(format!(
            "user '{}' already exists",
            user.email
        )));
    }

    conn.execute(
        "INSERT INTO Users (email, user_details) VALUES (?1, ?2)",
        params![user.email, user.details],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, email: &str) -> RailResult<usize> {
    Ok(conn.execute("DELETE FROM Users WHERE email = ?1", params![email])?)
}

pub fn list(conn: &Connection) -> RailResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT email, user_details FROM Users ORDER BY email")?;
    let users = stmt
        .query_map([], |row| {
            Ok(User {
                email: row.get(0)?,
                details: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}
