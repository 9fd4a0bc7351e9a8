use serde::Serialize;

use super::{EntityKey, Schedule};

/// Graph entities whose train row no longer exists in the ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub orphaned_schedules: Vec<Schedule>,
    pub orphaned_train_nodes: Vec<EntityKey>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned_schedules.is_empty() && self.orphaned_train_nodes.is_empty()
    }
}
