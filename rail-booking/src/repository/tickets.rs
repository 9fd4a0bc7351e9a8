//! `Tickets` and `PurchaseHistory` rows

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::error::RailResult;
use crate::models::{EntityKey, PurchaseRecord, Ticket};

/// Ticket fields chosen by the caller; the ledger assigns the id
pub struct NewTicket<'a> {
    pub user_email: &'a str,
    pub train: EntityKey,
    pub purchase_date: DateTime<Utc>,
    pub reserved_seat: bool,
    pub price: f64,
    pub start_station: EntityKey,
    pub end_station: EntityKey,
}

const TICKET_COLUMNS: &str = "ticket_id, user_email, train_id, purchase_date, reserved_seat, \
     price, start_station_key, end_station_key";

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        ticket_id: row.get(0)?,
        user_email: row.get(1)?,
        train: row.get(2)?,
        purchase_date: row.get(3)?,
        reserved_seat: row.get(4)?,
        price: row.get(5)?,
        start_station: row.get(6)?,
        end_station: row.get(7)?,
    })
}

/// Insert the ticket and its purchase-history row
pub fn insert(conn: &Connection, ticket: NewTicket<'_>) -> RailResult<Ticket> {
    conn.execute(
        "INSERT INTO Tickets
             (user_email, train_id, purchase_date, reserved_seat, price,
              start_station_key, end_station_key)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            ticket.user_email,
            ticket.train,
            ticket.purchase_date,
            ticket.reserved_seat,
            ticket.price,
            ticket.start_station,
            ticket.end_station,
        ],
    )?;
    let ticket_id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO PurchaseHistory (user_email, ticket_id, purchase_date) VALUES (?1, ?2, ?3)",
        params![ticket.user_email, ticket_id, ticket.purchase_date],
    )?;

    Ok(Ticket {
        ticket_id,
        user_email: ticket.user_email.to_string(),
        train: ticket.train,
        purchase_date: ticket.purchase_date,
        reserved_seat: ticket.reserved_seat,
        price: ticket.price,
        start_station: ticket.start_station,
        end_station: ticket.end_station,
    })
}

pub fn for_user(conn: &Connection, email: &str) -> RailResult<Vec<Ticket>> {
    let sql = format!(
        "SELECT {} FROM Tickets WHERE user_email = ?1 ORDER BY ticket_id",
        TICKET_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let tickets = stmt
        .query_map(params![email], ticket_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tickets)
}

pub fn for_train(conn: &Connection, train: EntityKey) -> RailResult<Vec<Ticket>> {
    let sql = format!(
        "SELECT {} FROM Tickets WHERE train_id = ?1 ORDER BY ticket_id",
        TICKET_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let tickets = stmt
        .query_map(params![train], ticket_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tickets)
}

/// Most recent purchase first; tickets bought at the same instant fall back
/// to the newer ticket id first
pub fn purchase_history(conn: &Connection, email: &str) -> RailResult<Vec<PurchaseRecord>> {
    let mut stmt = conn.prepare(
        "SELECT t.ticket_id, ph.purchase_date, t.price, t.reserved_seat, tr.status,
                t.start_station_key, t.end_station_key
         FROM PurchaseHistory ph
         JOIN Tickets t ON ph.ticket_id = t.ticket_id
         JOIN Trains tr ON t.train_id = tr.train_id
         WHERE ph.user_email = ?1
         ORDER BY ph.purchase_date DESC, t.ticket_id DESC",
    )?;

    let records = stmt
        .query_map(params![email], |row| {
            Ok(PurchaseRecord {
                ticket_id: row.get(0)?,
                purchase_date: row.get(1)?,
                price: row.get(2)?,
                reserved_seat: row.get(3)?,
                train_status: row.get(4)?,
                start_station: row.get(5)?,
                end_station: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Train of every reserved ticket the user holds, one entry per ticket
pub fn reserved_trains_for_user(conn: &Connection, email: &str) -> RailResult<Vec<EntityKey>> {
    let mut stmt = conn.prepare(
        "SELECT train_id FROM Tickets
         WHERE user_email = ?1 AND reserved_seat = 1
         ORDER BY ticket_id",
    )?;
    let trains = stmt
        .query_map(params![email], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(trains)
}

/// Clear the reserved flag on every reserved ticket of a train
pub fn clear_reservations_for_train(conn: &Connection, train: EntityKey) -> RailResult<usize> {
    Ok(conn.execute(
        "UPDATE Tickets SET reserved_seat = 0 WHERE train_id = ?1 AND reserved_seat = 1",
        params![train],
    )?)
}

/// Delete a train's tickets together with their history rows
pub fn delete_for_train(conn: &Connection, train: EntityKey) -> RailResult<usize> {
    conn.execute(
        "DELETE FROM PurchaseHistory
         WHERE ticket_id IN (SELECT ticket_id FROM Tickets WHERE train_id = ?1)",
        params![train],
    )?;
    Ok(conn.execute("DELETE FROM Tickets WHERE train_id = ?1", params![train])?)
}

/// Delete a user's history rows and tickets
pub fn delete_for_user(conn: &Connection, email: &str) -> RailResult<usize> {
    conn.execute("DELETE FROM PurchaseHistory WHERE user_email = ?1", params![email])?;
    Ok(conn.execute("DELETE FROM Tickets WHERE user_email = ?1", params![email])?)
}

pub fn history_len(conn: &Connection, email: &str) -> RailResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM PurchaseHistory WHERE user_email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}
