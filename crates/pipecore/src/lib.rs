//! Core abstractions for the pipeline engine
//!
//! This crate provides the fundamental types and traits that all other
//! components depend on: the workflow model, the dependency graph, the
//! dynamic value type, node configuration, run logs/records, and the
//! `NodeBehavior` execution contract.

mod config;
mod error;
mod events;
mod graph;
mod log;
mod node;
mod run;
mod value;
mod workflow;

pub use config::NodeConfig;
pub use error::{BehaviorError, EngineError, GraphError};
pub use events::{EventBus, RunEvent, RunLogger};
pub use graph::DependencyGraph;
pub use log::{LogEntry, LogLevel, RunLog};
pub use node::{ExecutionContext, NodeBehavior, NodeStatus};
pub use run::{RunId, RunRecord, RunStatus};
pub use value::Value;
pub use workflow::{
    kind, Connection, ConnectionId, NodeId, NodeSpec, Position, Workflow, WorkflowId,
    WorkflowStatus,
};
