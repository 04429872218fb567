//! Built-in node behaviors
//!
//! One `NodeBehavior` implementation per shipped node type, plus the narrow
//! collaborator traits standing in for the external integrations (query
//! engine, model inference, storage).

mod http;
mod query;
mod script;
mod storage;
mod strategy;
mod timer;

pub use http::HttpRequestBehavior;
pub use query::{DatabaseQueryBehavior, QueryBackend, StaticQueryBackend};
pub use script::ScriptBehavior;
pub use storage::{MemorySink, RecordSink, StorageBehavior};
pub use strategy::{
    HeuristicSignalProvider, Signal, SignalAction, SignalProvider, StrategyBehavior,
};
pub use timer::TimerBehavior;

use piperuntime::BehaviorRegistry;
use std::sync::Arc;

/// Register every built-in behavior with a registry.
///
/// The remaining glossary tags (DATA_COLLECT, TRANSFORM, FILTER,
/// EXECUTION, SOURCE) have no dedicated behavior and resolve to the
/// registry's pass-through fallback.
pub fn register_builtin(registry: &mut BehaviorRegistry) {
    registry.register(Arc::new(TimerBehavior));
    registry.register(Arc::new(DatabaseQueryBehavior::default()));
    registry.register(Arc::new(HttpRequestBehavior::new()));
    registry.register(Arc::new(ScriptBehavior));
    registry.register(Arc::new(StrategyBehavior::default()));
    registry.register(Arc::new(StorageBehavior::default()));
}
