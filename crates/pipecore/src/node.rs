use crate::config::NodeConfig;
use crate::error::BehaviorError;
use crate::events::RunLogger;
use crate::value::Value;
use crate::workflow::NodeId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Per-run execution status of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Error,
}

/// Behavior contract every node type implements.
///
/// This is the engine's sole extension point: new node types are added by
/// registering a new behavior, never by modifying the engine.
#[async_trait]
pub trait NodeBehavior: Send + Sync {
    /// Type tag this behavior is registered under (e.g. `"TIMER"`)
    fn kind(&self) -> &str;

    /// Default display name for nodes of this type
    fn label(&self) -> &str {
        self.kind()
    }

    fn description(&self) -> &str {
        ""
    }

    /// Runs the node. Reads only `ctx.inputs` and `ctx.config`, may emit
    /// log entries through `ctx.log`, and always produces a result:
    /// `Ok(output)` on success, `Err` to signal a node error. Timeouts are
    /// the caller's responsibility.
    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError>;
}

/// Ephemeral context handed to a behavior, one instance per node per run.
pub struct ExecutionContext {
    pub node_id: NodeId,

    /// Concatenated outputs of all direct predecessors, in their
    /// topological visit order. Array outputs are flattened one level;
    /// anything else arrives as a single element. Empty for entry nodes.
    pub inputs: Vec<Value>,

    /// Snapshot of the node's configuration
    pub config: NodeConfig,

    /// Log sink bound to this node id
    pub log: RunLogger,

    /// Raised when the run is cancelled; an in-flight behavior may finish,
    /// no further nodes are dispatched after it.
    pub cancellation: CancellationToken,
}

impl ExecutionContext {
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}
