use chrono::NaiveDate;
use std::sync::Arc;

use crate::{
    error::{RailError, RailResult},
    ledger::SqliteLedger,
    models::{Connection, EntityKey, Schedule, Station, Stop, TrainStatus},
    repository::{tickets, trains, ScheduleRepository, StationRepository},
};

/// Creation and removal of trains, stations, connections and schedules
///
/// Deletions touch the graph first and the ledger second; each store's
/// statements run in that store's own transaction.
pub struct LifecycleService {
    ledger: Arc<SqliteLedger>,
    station_repo: Arc<StationRepository>,
    schedule_repo: Arc<ScheduleRepository>,
}

impl LifecycleService {
    pub fn new(
        ledger: Arc<SqliteLedger>,
        station_repo: Arc<StationRepository>,
        schedule_repo: Arc<ScheduleRepository>,
    ) -> Self {
        Self {
            ledger,
            station_repo,
            schedule_repo,
        }
    }

    /// Add a train; the ledger generates the key when none is given
    pub fn add_train(
        &self,
        key: Option<EntityKey>,
        capacity: u32,
        status: TrainStatus,
    ) -> RailResult<EntityKey> {
        let key = self
            .ledger
            .transaction(|tx| trains::insert(tx, key, capacity, status))?;

        tracing::info!(train = %key, capacity, status = ?status, "train added");
        Ok(key)
    }

    /// Raise capacity and/or change status
    ///
    /// Switching to `Broken` clears every reservation on the train without
    /// giving the seats back.
    pub fn update_train_details(
        &self,
        key: EntityKey,
        capacity: Option<u32>,
        status: Option<TrainStatus>,
    ) -> RailResult<()> {
        let cleared = self.ledger.transaction(|tx| {
            let train = trains::require(tx, key)?;

            if let Some(capacity) = capacity {
                if capacity < train.capacity {
                    return Err(RailError::InvalidArgument(
                        "capacity cannot be decreased".to_string(),
                    ));
                }
                trains::set_capacity(tx, key, capacity)?;
            }

            let mut cleared = 0;
            if let Some(status) = status {
                trains::set_status(tx, key, status)?;
                match status {
                    TrainStatus::Broken => {
                        cleared = tickets::clear_reservations_for_train(tx, key)?;
                    }
                    TrainStatus::Operational | TrainStatus::Delayed => {}
                }
            }

            Ok(cleared)
        })?;

        tracing::info!(
            train = %key,
            ?capacity,
            ?status,
            cleared_reservations = cleared,
            "train updated"
        );
        Ok(())
    }

    /// Remove a train with its schedules, tickets and history
    ///
    /// An unknown key succeeds without changing anything.
    pub async fn delete_train(&self, key: EntityKey) -> RailResult<()> {
        let schedules = self.schedule_repo.delete_train_schedules(key).await?;

        let (tickets_removed, rows) = self.ledger.transaction(|tx| {
            let tickets_removed = tickets::delete_for_train(tx, key)?;
            let rows = trains::delete(tx, key)?;
            Ok((tickets_removed, rows))
        })?;

        tracing::info!(
            train = %key,
            schedules,
            tickets = tickets_removed,
            existed = rows > 0,
            "train deleted"
        );
        Ok(())
    }

    pub fn get_train_current_status(&self, key: EntityKey) -> RailResult<Option<TrainStatus>> {
        self.ledger
            .with_connection(|conn| Ok(trains::find(conn, key)?.map(|t| t.status)))
    }

    pub async fn add_train_station(
        &self,
        key: EntityKey,
        details: Option<String>,
    ) -> RailResult<Station> {
        let station = self.station_repo.create_station(key, details).await?;

        tracing::info!(station = %key, "station added");
        Ok(station)
    }

    /// Add the directed connection `from -> to`
    pub async fn connect_train_stations(
        &self,
        from: EntityKey,
        to: EntityKey,
        travel_time: u32,
    ) -> RailResult<Connection> {
        if from == to {
            return Err(RailError::InvalidArgument(
                "a station cannot be connected to itself".to_string(),
            ));
        }
        if !(Connection::MIN_TRAVEL_TIME..=Connection::MAX_TRAVEL_TIME).contains(&travel_time) {
            return Err(RailError::InvalidArgument(format!(
                "travel time {} is outside {}..={} minutes",
                travel_time,
                Connection::MIN_TRAVEL_TIME,
                Connection::MAX_TRAVEL_TIME
            )));
        }

        let start = self.station_repo.require_station(from).await?;
        let end = self.station_repo.require_station(to).await?;

        let connection = self
            .station_repo
            .create_connection(&start, &end, travel_time)
            .await?;

        tracing::info!(from = %from, to = %to, travel_time, "stations connected");
        Ok(connection)
    }

    /// Add a schedule for a train over connected stops
    ///
    /// `stops` pairs each station with its waiting time in minutes.
    pub async fn add_schedule(
        &self,
        train: Option<EntityKey>,
        starting_hours_24_h: u32,
        starting_minutes: u32,
        stops: &[(Option<EntityKey>, u32)],
        valid_from: NaiveDate,
        valid_until: NaiveDate,
    ) -> RailResult<Schedule> {
        let train = train
            .ok_or_else(|| RailError::InvalidArgument("train key is required".to_string()))?;

        let stops = stops
            .iter()
            .enumerate()
            .map(|(order, (station, waiting_time))| {
                station
                    .map(|s| Stop::new(s, *waiting_time, order as u32))
                    .ok_or_else(|| {
                        RailError::InvalidArgument("stop station key is required".to_string())
                    })
            })
            .collect::<RailResult<Vec<_>>>()?;

        if stops.len() < 2 {
            return Err(RailError::InvalidArgument(
                "a schedule needs at least two stops".to_string(),
            ));
        }
        if starting_hours_24_h > 23 || starting_minutes > 59 {
            return Err(RailError::InvalidArgument(format!(
                "invalid start time {}:{:02}",
                starting_hours_24_h, starting_minutes
            )));
        }
        if valid_from >= valid_until {
            return Err(RailError::InvalidArgument(
                "valid_from must precede valid_until".to_string(),
            ));
        }

        self.ledger
            .with_connection(|conn| trains::require(conn, train))?;

        for pair in stops.windows(2) {
            let from = self.station_repo.require_station(pair[0].station_id).await?;
            let to = self.station_repo.require_station(pair[1].station_id).await?;

            if self.station_repo.find_connection(&from, &to).await?.is_none() {
                return Err(RailError::InvalidArgument(format!(
                    "consecutive stops must be connected: {} -> {}",
                    from.key, to.key
                )));
            }
        }

        let schedule = Schedule {
            id: None,
            train_id: train,
            starting_hours_24_h,
            starting_minutes,
            valid_from,
            valid_until,
            stops,
        };
        let stored = self.schedule_repo.create_schedule(&schedule).await?;

        tracing::info!(
            train = %train,
            stops = stored.stops.len(),
            %valid_from,
            %valid_until,
            "schedule added"
        );
        Ok(stored)
    }
}
