use chrono::NaiveDate;
use rail_graph_db::VariableLengthPath;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::SearchConfig,
    error::{RailError, RailResult},
    models::{Connection, EntityKey, RouteSummary, ScheduleRun, SearchQuery, SortingCriteria},
    repository::{ScheduleRepository, StationRepository},
};

/// Timed runs of every connection, keyed by the (from, to) station pair
type RunIndex = HashMap<(EntityKey, EntityKey), Vec<ScheduleRun>>;

pub struct RouteSearchService {
    station_repo: Arc<StationRepository>,
    schedule_repo: Arc<ScheduleRepository>,
    config: SearchConfig,
}

impl RouteSearchService {
    pub fn new(
        station_repo: Arc<StationRepository>,
        schedule_repo: Arc<ScheduleRepository>,
        config: SearchConfig,
    ) -> Self {
        Self {
            station_repo,
            schedule_repo,
            config,
        }
    }

    /// Ranked connections between two stations
    pub async fn search_connections(&self, query: &SearchQuery) -> RailResult<Vec<RouteSummary>> {
        if query.start == query.end {
            return Err(RailError::InvalidArgument(
                "starting and ending stations cannot be the same".to_string(),
            ));
        }

        let from = self.station_repo.require_station(query.start).await?;
        let to = self.station_repo.require_station(query.end).await?;

        let keys = self.station_repo.station_keys().await?;

        // A simple path visits each station at most once
        let longest = keys.len().saturating_sub(1).max(1);
        let max_hops = match self.config.max_hops {
            Some(cap) => cap.min(longest),
            None => longest,
        };

        let paths = self
            .station_repo
            .paths_between(&from, &to, max_hops)
            .await?;
        if paths.is_empty() {
            tracing::debug!(start = %query.start, end = %query.end, "no path between stations");
            return Ok(Vec::new());
        }

        let runs = self.run_index(query.travel_date).await?;

        let mut summaries = Vec::with_capacity(paths.len());
        for path in &paths {
            if let Some(summary) = summarize(path, &keys, &runs, query)? {
                summaries.push(summary);
            }
        }

        let limit = query.limit.unwrap_or(self.config.default_limit);
        let ranked = rank(summaries, query.sort_by, query.ascending, limit);

        tracing::debug!(
            start = %query.start,
            end = %query.end,
            paths = paths.len(),
            returned = ranked.len(),
            sort_by = ?query.sort_by,
            "searched connections"
        );
        Ok(ranked)
    }

    /// Expand candidate schedules into runs; with a date only schedules
    /// active on it are candidates
    async fn run_index(&self, travel_date: Option<NaiveDate>) -> RailResult<RunIndex> {
        let connections = self.station_repo.connections_by_stations().await?;
        let travel_time = |from: EntityKey, to: EntityKey| {
            connections.get(&(from, to)).map(|c| c.travel_time)
        };

        let mut index = RunIndex::new();
        for schedule in self.schedule_repo.list_schedules().await? {
            if let Some(date) = travel_date {
                if !schedule.is_active_on(date) {
                    continue;
                }
            }

            for run in schedule.runs(&travel_time) {
                index.entry((run.from, run.to)).or_default().push(run);
            }
        }

        Ok(index)
    }
}

/// Metrics for one path; `None` when a dated search finds an edge no active
/// schedule serves
fn summarize(
    path: &VariableLengthPath,
    keys: &HashMap<rail_graph_db::Graphid, EntityKey>,
    runs: &RunIndex,
    query: &SearchQuery,
) -> RailResult<Option<RouteSummary>> {
    let stations = path
        .vertices
        .iter()
        .map(|id| {
            keys.get(id)
                .copied()
                .ok_or_else(|| RailError::Internal(format!("path vertex {} is not a station", id)))
        })
        .collect::<RailResult<Vec<_>>>()?;

    let connections = path
        .edges
        .iter()
        .map(Connection::from_edge)
        .collect::<RailResult<Vec<_>>>()?;

    let edge_runs: Vec<&[ScheduleRun]> = stations
        .windows(2)
        .map(|pair| runs.get(&(pair[0], pair[1])).map(Vec::as_slice).unwrap_or(&[]))
        .collect();

    if query.travel_date.is_some() && edge_runs.iter().any(|r| r.is_empty()) {
        return Ok(None);
    }

    Ok(Some(RouteSummary {
        start_key: query.start,
        end_key: query.end,
        estimated_price: connections.iter().map(|c| c.price).sum(),
        travel_time: connections.iter().map(|c| c.travel_time).sum(),
        changes: connections.len().saturating_sub(1) as u32,
        waiting_time: waiting_time(&edge_runs),
        stations,
    }))
}

/// Total wait at intermediate stations
///
/// The first edge takes its earliest departure; each later edge takes the
/// run that leaves soonest after the previous arrival.
fn waiting_time(edge_runs: &[&[ScheduleRun]]) -> Option<u32> {
    if edge_runs.len() < 2 || edge_runs.iter().any(|r| r.is_empty()) {
        return None;
    }

    let mut current = edge_runs[0].iter().min_by_key(|r| r.departure)?;
    let mut total = 0;

    for runs in &edge_runs[1..] {
        let next = runs.iter().min_by_key(|r| current.wait_until(r))?;
        total += current.wait_until(next);
        current = next;
    }

    Some(total)
}

/// Stable sort by one criterion, then truncate
///
/// Under waiting time, paths without a waiting time are not ranked and
/// follow the ranked ones in their original order.
fn rank(
    mut summaries: Vec<RouteSummary>,
    sort_by: SortingCriteria,
    ascending: bool,
    limit: usize,
) -> Vec<RouteSummary> {
    let directed = |ordering: Ordering| if ascending { ordering } else { ordering.reverse() };

    match sort_by {
        SortingCriteria::OverallTravelTime => {
            summaries.sort_by(|a, b| directed(a.travel_time.cmp(&b.travel_time)));
        }
        SortingCriteria::NumberOfChanges => {
            summaries.sort_by(|a, b| directed(a.changes.cmp(&b.changes)));
        }
        SortingCriteria::EstimatedPrice => {
            summaries.sort_by(|a, b| directed(a.estimated_price.total_cmp(&b.estimated_price)));
        }
        SortingCriteria::OverallWaitingTime => {
            let (mut ranked, unranked): (Vec<_>, Vec<_>) =
                summaries.into_iter().partition(|s| s.waiting_time.is_some());
            ranked.sort_by(|a, b| directed(a.waiting_time.cmp(&b.waiting_time)));
            ranked.extend(unranked);
            summaries = ranked;
        }
    }

    summaries.truncate(limit);
    summaries
}
