use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityKey, TrainStatus};

/// One train segment of an itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryLeg {
    pub train: EntityKey,
    pub start_station: EntityKey,
    pub end_station: EntityKey,
    pub travel_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: i64,
    pub user_email: String,
    /// Train of the last leg
    pub train: EntityKey,
    pub purchase_date: DateTime<Utc>,
    pub reserved_seat: bool,
    pub price: f64,
    pub start_station: EntityKey,
    pub end_station: EntityKey,
}

/// Row of a user's purchase history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub ticket_id: i64,
    pub purchase_date: DateTime<Utc>,
    pub price: f64,
    pub reserved_seat: bool,
    pub train_status: TrainStatus,
    pub start_station: EntityKey,
    pub end_station: EntityKey,
}

impl ItineraryLeg {
    pub fn new(
        train: EntityKey,
        start_station: EntityKey,
        end_station: EntityKey,
        travel_time: u32,
    ) -> Self {
        Self {
            train,
            start_station,
            end_station,
            travel_time,
        }
    }
}
