use std::sync::Arc;

use crate::{
    error::RailResult,
    ledger::SqliteLedger,
    models::{AuditReport, Schedule},
    repository::{trains, ScheduleRepository},
};

/// Cross-store consistency checks
///
/// Graph and ledger writes are not atomic together, so a failure between
/// them can leave schedules for trains the ledger no longer knows.
pub struct AuditService {
    ledger: Arc<SqliteLedger>,
    schedule_repo: Arc<ScheduleRepository>,
}

impl AuditService {
    pub fn new(ledger: Arc<SqliteLedger>, schedule_repo: Arc<ScheduleRepository>) -> Self {
        Self {
            ledger,
            schedule_repo,
        }
    }

    pub async fn get_all_schedules(&self) -> RailResult<Vec<Schedule>> {
        self.schedule_repo.list_schedules().await
    }

    /// Find schedules and train nodes whose train row is gone
    pub async fn audit(&self) -> RailResult<AuditReport> {
        let known = self.ledger.with_connection(trains::all_keys)?;

        let orphaned_schedules: Vec<Schedule> = self
            .schedule_repo
            .list_schedules()
            .await?
            .into_iter()
            .filter(|s| !known.contains(&s.train_id))
            .collect();

        let orphaned_train_nodes = self
            .schedule_repo
            .train_nodes()
            .await?
            .into_iter()
            .filter(|(_, key)| !known.contains(key))
            .map(|(_, key)| key)
            .collect();

        let report = AuditReport {
            orphaned_schedules,
            orphaned_train_nodes,
        };

        if !report.is_clean() {
            tracing::warn!(
                schedules = report.orphaned_schedules.len(),
                train_nodes = report.orphaned_train_nodes.len(),
                "graph holds entities for missing trains"
            );
        }
        Ok(report)
    }

    /// Delete what `audit` finds and return that report
    pub async fn repair(&self) -> RailResult<AuditReport> {
        let report = self.audit().await?;
        if report.is_clean() {
            return Ok(report);
        }

        let train_nodes: Vec<_> = self
            .schedule_repo
            .train_nodes()
            .await?
            .into_iter()
            .filter(|(_, key)| report.orphaned_train_nodes.contains(key))
            .map(|(id, _)| id)
            .collect();

        self.schedule_repo
            .delete_cascade(&report.orphaned_schedules, &train_nodes)
            .await?;

        tracing::info!(
            schedules = report.orphaned_schedules.len(),
            train_nodes = train_nodes.len(),
            "repaired orphaned graph entities"
        );
        Ok(report)
    }
}
