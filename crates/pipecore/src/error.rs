use crate::workflow::{ConnectionId, NodeId};
use thiserror::Error;

/// Errors the engine surfaces past its boundary.
///
/// Deliberately narrow: a node behavior failing is not an engine error —
/// it is absorbed into the run record as a log entry plus terminal status.
/// Only structural rejection of a snapshot and lookup misses escape as
/// `Err`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),
}

/// Structural errors detected while building the dependency graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Cycle detected in workflow graph")]
    CycleDetected,

    #[error("Connection {connection} references unknown node {node}")]
    DanglingReference {
        connection: ConnectionId,
        node: NodeId,
    },

    #[error("Connection {connection} is a self-loop on node {node}")]
    SelfLoop {
        connection: ConnectionId,
        node: NodeId,
    },
}

/// Failures signalled by a node behavior's `execute`.
#[derive(Error, Debug, Clone)]
pub enum BehaviorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Cancelled")]
    Cancelled,
}
