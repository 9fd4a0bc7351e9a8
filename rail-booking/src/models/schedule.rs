use chrono::NaiveDate;
use rail_graph_db::{Graphid, Vertex};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::EntityKey;
use crate::error::RailResult;

pub const SCHEDULE_LABEL: &str = "Schedule";
pub const STOP_LABEL: &str = "Stop";
pub const TRAIN_LABEL: &str = "Train";
pub const HAS_STOPS_LABEL: &str = "Has_Stops";
pub const SCHEDULE_EDGE_LABEL: &str = "SCHEDULE";

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Recurring timetable of one train over ordered stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Graphid>,
    pub train_id: EntityKey,
    pub starting_hours_24_h: u32,
    pub starting_minutes: u32,
    pub valid_from: NaiveDate,
    /// Exclusive
    pub valid_until: NaiveDate,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

/// One station visit within a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Graphid>,
    pub station_id: EntityKey,
    /// Minutes spent at the station before departing
    pub waiting_time: u32,
    pub order: u32,
}

/// One timed traversal of a connection by a schedule, in minutes of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRun {
    pub from: EntityKey,
    pub to: EntityKey,
    pub departure: u32,
    pub arrival: u32,
}

impl Schedule {
    pub fn from_vertex(vertex: &Vertex) -> RailResult<Self> {
        let mut schedule: Schedule = serde_json::from_value(vertex.properties.clone())?;
        schedule.id = Some(vertex.id);
        Ok(schedule)
    }

    pub fn properties(&self) -> serde_json::Value {
        json!({
            "train_id": self.train_id.to_int(),
            "starting_hours_24_h": self.starting_hours_24_h,
            "starting_minutes": self.starting_minutes,
            "valid_from": self.valid_from,
            "valid_until": self.valid_until,
        })
    }

    /// Half-open validity window `[valid_from, valid_until)`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date < self.valid_until
    }

    pub fn start_minute(&self) -> u32 {
        self.starting_hours_24_h * 60 + self.starting_minutes
    }

    /// Expand the timetable into runs between consecutive stops
    ///
    /// `travel_time` resolves the connection between two stations; expansion
    /// stops at the first pair it cannot resolve.
    pub fn runs<F>(&self, travel_time: F) -> Vec<ScheduleRun>
    where
        F: Fn(EntityKey, EntityKey) -> Option<u32>,
    {
        let mut stops: Vec<&Stop> = self.stops.iter().collect();
        stops.sort_by_key(|s| s.order);

        let mut runs = Vec::with_capacity(stops.len().saturating_sub(1));
        let mut departure = self.start_minute();

        for pair in stops.windows(2) {
            let (from, to) = (pair[0].station_id, pair[1].station_id);
            let Some(minutes) = travel_time(from, to) else {
                break;
            };
            let arrival = departure + minutes;
            runs.push(ScheduleRun {
                from,
                to,
                departure: departure % MINUTES_PER_DAY,
                arrival: arrival % MINUTES_PER_DAY,
            });
            departure = arrival + pair[1].waiting_time;
        }

        runs
    }
}

impl Stop {
    pub fn new(station_id: EntityKey, waiting_time: u32, order: u32) -> Self {
        Self {
            id: None,
            station_id,
            waiting_time,
            order,
        }
    }

    pub fn from_vertex(vertex: &Vertex) -> RailResult<Self> {
        let mut stop: Stop = serde_json::from_value(vertex.properties.clone())?;
        stop.id = Some(vertex.id);
        Ok(stop)
    }

    pub fn properties(&self) -> serde_json::Value {
        json!({
            "station_id": self.station_id.to_int(),
            "waiting_time": self.waiting_time,
            "order": self.order,
        })
    }
}

impl ScheduleRun {
    /// Minutes between arriving with `self` and departing with `next`,
    /// wrapping past midnight
    pub fn wait_until(&self, next: &ScheduleRun) -> u32 {
        let diff = next.departure as i64 - self.arrival as i64;
        diff.rem_euclid(MINUTES_PER_DAY as i64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i64) -> EntityKey {
        EntityKey::new(n)
    }

    fn schedule(hour: u32, minute: u32, stops: &[(i64, u32)]) -> Schedule {
        Schedule {
            id: None,
            train_id: key(1),
            starting_hours_24_h: hour,
            starting_minutes: minute,
            valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            stops: stops
                .iter()
                .enumerate()
                .map(|(i, (s, w))| Stop::new(key(*s), *w, i as u32))
                .collect(),
        }
    }

    #[test]
    fn test_validity_window_is_half_open() {
        let s = schedule(8, 0, &[(1, 0), (2, 0)]);
        assert!(s.is_active_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(s.is_active_on(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!s.is_active_on(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(!s.is_active_on(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }

    #[test]
    fn test_runs_accumulate_travel_and_waiting() {
        let s = schedule(8, 0, &[(1, 5), (2, 10), (3, 0)]);
        let runs = s.runs(|_, _| Some(30));

        assert_eq!(runs.len(), 2);
        // First stop's wait is ignored: departs at the start time
        assert_eq!((runs[0].departure, runs[0].arrival), (480, 510));
        assert_eq!((runs[1].departure, runs[1].arrival), (520, 550));
    }

    #[test]
    fn test_runs_follow_stop_order_and_wrap_midnight() {
        let mut s = schedule(23, 50, &[(1, 0), (2, 0)]);
        s.stops.reverse();
        let runs = s.runs(|_, _| Some(20));

        assert_eq!(runs[0].from, key(1));
        assert_eq!((runs[0].departure, runs[0].arrival), (1430, 10));
    }

    #[test]
    fn test_runs_stop_at_unresolved_pair() {
        let s = schedule(8, 0, &[(1, 0), (2, 0), (3, 0)]);
        let runs = s.runs(|from, _| if from == key(1) { Some(10) } else { None });

        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_wait_wraps_to_next_day() {
        let arrive = ScheduleRun { from: key(1), to: key(2), departure: 600, arrival: 630 };
        let later = ScheduleRun { from: key(2), to: key(3), departure: 645, arrival: 700 };
        let earlier = ScheduleRun { from: key(2), to: key(3), departure: 620, arrival: 650 };

        assert_eq!(arrive.wait_until(&later), 15);
        assert_eq!(arrive.wait_until(&earlier), MINUTES_PER_DAY - 10);
    }

    #[test]
    fn test_schedule_properties_decode() {
        let s = schedule(9, 15, &[(1, 0), (2, 0)]);
        let vertex = Vertex::new(Graphid::new(3, 1).unwrap(), SCHEDULE_LABEL, s.properties());

        let decoded = Schedule::from_vertex(&vertex).unwrap();
        assert_eq!(decoded.start_minute(), 555);
        assert_eq!(decoded.valid_until, s.valid_until);
        assert!(decoded.stops.is_empty());
    }
}
