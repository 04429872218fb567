use crate::workflow::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Severity of a run log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// One structured log line emitted during a run. Immutable once appended.
///
/// `node_id` is `None` for entries synthesized by the engine itself
/// (cycle failures, cancellation notices).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub node_id: Option<NodeId>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(node_id: Option<NodeId>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            node_id,
            level,
            message: message.into(),
        }
    }
}

/// Shared append-only buffer collecting one run's log entries in order.
///
/// Appends across concurrently-logging nodes are serialized by the mutex;
/// within the sequential engine the order is simply execution order.
#[derive(Clone, Default)]
pub struct RunLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies out the entries appended so far, in append order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let log = RunLog::new();
        log.append(LogEntry::new(None, LogLevel::Info, "first"));
        log.append(LogEntry::new(None, LogLevel::Error, "second"));
        let entries = log.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
    }
}
