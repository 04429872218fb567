use crate::log::LogEntry;
use crate::workflow::WorkflowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RunId = Uuid;

/// Terminal status of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Audit record of one workflow run. Finalized once, then append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: RunId,
    pub workflow_id: WorkflowId,
    pub timestamp: DateTime<Utc>,
    pub status: RunStatus,
    pub duration_ms: u64,
    /// All entries emitted during the run, interleaved in execution order
    pub logs: Vec<LogEntry>,
}
