use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityKey;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum SortingCriteria {
    #[default]
    OverallTravelTime,
    NumberOfChanges,
    OverallWaitingTime,
    EstimatedPrice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub start: EntityKey,
    pub end: EntityKey,
    pub travel_date: Option<NaiveDate>,
    pub sort_by: SortingCriteria,
    pub ascending: bool,
    /// Falls back to the configured default when unset
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(start: EntityKey, end: EntityKey) -> Self {
        Self {
            start,
            end,
            travel_date: None,
            sort_by: SortingCriteria::default(),
            ascending: true,
            limit: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.travel_date = Some(date);
        self
    }

    pub fn sorted_by(mut self, criteria: SortingCriteria, ascending: bool) -> Self {
        self.sort_by = criteria;
        self.ascending = ascending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Metrics of one path between the searched stations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub start_key: EntityKey,
    pub end_key: EntityKey,
    pub estimated_price: f64,
    pub travel_time: u32,
    pub changes: u32,
    pub waiting_time: Option<u32>,
    /// Stations visited, endpoints included
    pub stations: Vec<EntityKey>,
}
