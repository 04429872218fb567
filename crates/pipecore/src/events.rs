use crate::log::{LogEntry, LogLevel, RunLog};
use crate::node::NodeStatus;
use crate::run::{RunId, RunStatus};
use crate::workflow::{NodeId, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events broadcast while a run executes, for real-time observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    RunStarted {
        run_id: RunId,
        workflow_id: WorkflowId,
        timestamp: DateTime<Utc>,
    },
    RunFinished {
        run_id: RunId,
        status: RunStatus,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeStarted {
        run_id: RunId,
        node_id: NodeId,
        kind: String,
        timestamp: DateTime<Utc>,
    },
    NodeFinished {
        run_id: RunId,
        node_id: NodeId,
        status: NodeStatus,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    Log(LogEntry),
}

/// Broadcast bus for run events.
///
/// Slow or absent subscribers never block execution; send failures are
/// ignored because a run is valid without any observer.
pub struct EventBus {
    sender: broadcast::Sender<RunEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }

    /// Mints the log sink handed to one node for one run.
    pub fn logger(&self, run_log: RunLog, node_id: Option<NodeId>) -> RunLogger {
        RunLogger {
            run_log,
            node_id,
            sender: self.sender.clone(),
        }
    }
}

/// Per-node log sink bound to one run.
///
/// Every entry lands in the run's shared [`RunLog`] buffer and is mirrored
/// onto the event bus.
#[derive(Clone)]
pub struct RunLogger {
    run_log: RunLog,
    node_id: Option<NodeId>,
    sender: broadcast::Sender<RunEvent>,
}

impl RunLogger {
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(self.node_id, level, message);
        self.run_log.append(entry.clone());
        let _ = self.sender.send(RunEvent::Log(entry));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Rebinds the sink to another node id, sharing the same buffer.
    pub fn scoped(&self, node_id: Option<NodeId>) -> RunLogger {
        RunLogger {
            run_log: self.run_log.clone(),
            node_id,
            sender: self.sender.clone(),
        }
    }
}
