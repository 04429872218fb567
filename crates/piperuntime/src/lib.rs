//! Workflow execution runtime
//!
//! This crate drives workflow runs: it resolves node behaviors through the
//! registry, assembles per-node inputs, executes nodes in dependency order
//! with the continuation policy, and records every run in the append-only
//! history.

mod context;
mod engine;
mod history;
mod registry;
mod runtime;

pub use context::gather_inputs;
pub use engine::{Engine, RunReport};
pub use history::RunHistory;
pub use registry::BehaviorRegistry;
pub use runtime::{PipelineRuntime, RuntimeConfig};
