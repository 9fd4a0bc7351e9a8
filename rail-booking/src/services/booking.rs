use chrono::Utc;
use std::sync::Arc;

use crate::{
    error::{RailError, RailResult},
    ledger::SqliteLedger,
    models::{ItineraryLeg, PurchaseRecord, Ticket},
    repository::{
        tickets::{self, NewTicket},
        trains, users,
    },
};

/// Flat surcharge per leg when a seat is reserved
pub const RESERVATION_FEE_PER_LEG: f64 = 2.0;

pub struct BookingService {
    ledger: Arc<SqliteLedger>,
}

impl BookingService {
    pub fn new(ledger: Arc<SqliteLedger>) -> Self {
        Self { ledger }
    }

    /// Buy one ticket covering every leg
    ///
    /// Validation, the ticket and history inserts and the seat decrement all
    /// run in one IMMEDIATE ledger transaction. Only the last leg's train
    /// gives up a seat, but every leg's train must have one available.
    pub fn buy_ticket(
        &self,
        user_email: &str,
        legs: &[ItineraryLeg],
        reserve_seat: bool,
    ) -> RailResult<Ticket> {
        let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
            return Err(RailError::InvalidArgument(
                "an itinerary needs at least one leg".to_string(),
            ));
        };

        let ticket = self.ledger.transaction(|tx| {
            users::require(tx, user_email)?;

            let mut total_travel_time: u64 = 0;
            for leg in legs {
                let train = trains::require(tx, leg.train)?;
                if reserve_seat && train.capacity == 0 {
                    return Err(RailError::CapacityExceeded(
                        "no seats available for reservation".to_string(),
                    ));
                }
                total_travel_time += u64::from(leg.travel_time);
            }

            let ticket = tickets::insert(
                tx,
                NewTicket {
                    user_email,
                    train: last.train,
                    purchase_date: Utc::now(),
                    reserved_seat: reserve_seat,
                    price: itinerary_price(total_travel_time, legs.len(), reserve_seat),
                    start_station: first.start_station,
                    end_station: last.end_station,
                },
            )?;

            if reserve_seat {
                trains::reserve_seat(tx, last.train)?;
            }

            Ok(ticket)
        })?;

        tracing::info!(
            user = user_email,
            ticket = ticket.ticket_id,
            train = %ticket.train,
            legs = legs.len(),
            reserved = reserve_seat,
            price = ticket.price,
            "ticket purchased"
        );
        Ok(ticket)
    }

    /// The user's purchases, most recent first; empty for unknown users
    pub fn get_purchase_history(&self, user_email: &str) -> RailResult<Vec<PurchaseRecord>> {
        self.ledger
            .with_connection(|conn| tickets::purchase_history(conn, user_email))
    }
}

/// Half the travel minutes rounded to cents, plus the reservation fee per
/// leg when reserving
pub fn itinerary_price(total_travel_time: u64, legs: usize, reserve_seat: bool) -> f64 {
    let base = (total_travel_time as f64 / 2.0 * 100.0).round() / 100.0;
    if reserve_seat {
        base + RESERVATION_FEE_PER_LEG * legs as f64
    } else {
        base
    }
}
