use crate::context::gather_inputs;
use crate::registry::BehaviorRegistry;
use chrono::Utc;
use pipecore::{
    EngineError, EventBus, ExecutionContext, GraphError, LogEntry, LogLevel, NodeId, NodeStatus,
    RunEvent, RunId, RunLog, RunRecord, RunStatus, Value, Workflow,
};
use pipecore::DependencyGraph;
use std::collections::HashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Drives one workflow snapshot end-to-end and produces one run record.
///
/// Nodes execute strictly in topological order on one logical worker; the
/// order of log entries in the record is therefore deterministic for a
/// given snapshot and set of behaviors.
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Executes the workflow against the registered behaviors.
    ///
    /// Structural errors other than cycles (dangling references,
    /// self-loops) reject the snapshot with `Err` before a run record
    /// exists. A cycle produces a normal `Failed` record carrying exactly
    /// one engine-synthesized log entry.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        registry: &BehaviorRegistry,
        bus: &EventBus,
        cancellation: CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let run_id: RunId = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let run_log = RunLog::new();

        let graph = DependencyGraph::build(workflow)?;

        bus.emit(RunEvent::RunStarted {
            run_id,
            workflow_id: workflow.id,
            timestamp: started_at,
        });
        tracing::info!(workflow_id = %workflow.id, %run_id, "starting workflow run");

        let mut statuses: HashMap<NodeId, NodeStatus> = workflow
            .nodes
            .iter()
            .map(|n| (n.id, NodeStatus::Idle))
            .collect();

        let order = match graph.topological_order() {
            Ok(order) => order,
            Err(GraphError::CycleDetected) => {
                // Fatal before any node runs: one synthetic entry, all
                // nodes left idle.
                bus.logger(run_log.clone(), None).error(
                    "cycle detected in workflow graph, no nodes executed",
                );
                tracing::warn!(workflow_id = %workflow.id, "run aborted: cyclic graph");
                return Ok(self.finalize(
                    run_id,
                    workflow,
                    RunStatus::Failed,
                    start,
                    started_at,
                    run_log,
                    statuses,
                    HashMap::new(),
                    false,
                    bus,
                ));
            }
            Err(other) => return Err(other.into()),
        };

        let topo_position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut outputs: HashMap<NodeId, Value> = HashMap::new();
        let mut any_error = false;
        let mut cancelled = false;

        for node_id in order {
            if cancellation.is_cancelled() {
                bus.logger(run_log.clone(), None)
                    .warn("run cancelled, remaining nodes not dispatched");
                tracing::info!(%run_id, "run cancelled");
                cancelled = true;
                break;
            }

            // continuation policy: downstream of a failed (or skipped)
            // node stays idle, independent branches keep going
            let mut predecessors = graph.predecessors(node_id);
            predecessors.sort_by_key(|p| topo_position[p]);
            let blocked = predecessors
                .iter()
                .any(|p| statuses[p] != NodeStatus::Success);
            if blocked {
                tracing::debug!(%node_id, "skipping node downstream of a failure");
                continue;
            }

            let spec = match workflow.find_node(node_id) {
                Some(spec) => spec,
                None => continue,
            };

            statuses.insert(node_id, NodeStatus::Running);
            bus.emit(RunEvent::NodeStarted {
                run_id,
                node_id,
                kind: spec.kind.clone(),
                timestamp: Utc::now(),
            });

            let ctx = ExecutionContext {
                node_id,
                inputs: gather_inputs(&predecessors, &outputs),
                config: spec.config.clone(),
                log: bus.logger(run_log.clone(), Some(node_id)),
                cancellation: cancellation.clone(),
            };

            let behavior = registry.resolve(&spec.kind);
            let node_start = Instant::now();
            let result = behavior.execute(ctx).await;
            let node_duration = node_start.elapsed().as_millis() as u64;

            let status = match result {
                Ok(output) => {
                    tracing::debug!(%node_id, kind = %spec.kind, node_duration, "node succeeded");
                    outputs.insert(node_id, output);
                    NodeStatus::Success
                }
                Err(err) => {
                    tracing::warn!(%node_id, kind = %spec.kind, %err, "node failed");
                    bus.logger(run_log.clone(), Some(node_id))
                        .error(format!("node '{}' failed: {}", spec.label, err));
                    any_error = true;
                    NodeStatus::Error
                }
            };
            statuses.insert(node_id, status);
            bus.emit(RunEvent::NodeFinished {
                run_id,
                node_id,
                status,
                duration_ms: node_duration,
                timestamp: Utc::now(),
            });
        }

        let status = if any_error || cancelled {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };

        Ok(self.finalize(
            run_id, workflow, status, start, started_at, run_log, statuses, outputs, cancelled,
            bus,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        run_id: RunId,
        workflow: &Workflow,
        status: RunStatus,
        start: Instant,
        started_at: chrono::DateTime<Utc>,
        run_log: RunLog,
        node_statuses: HashMap<NodeId, NodeStatus>,
        outputs: HashMap<NodeId, Value>,
        cancelled: bool,
        bus: &EventBus,
    ) -> RunReport {
        let duration_ms = start.elapsed().as_millis() as u64;
        bus.emit(RunEvent::RunFinished {
            run_id,
            status,
            duration_ms,
            timestamp: Utc::now(),
        });
        tracing::info!(%run_id, ?status, duration_ms, "run finished");

        RunReport {
            record: RunRecord {
                id: run_id,
                workflow_id: workflow.id,
                timestamp: started_at,
                status,
                duration_ms,
                logs: run_log.snapshot(),
            },
            node_statuses,
            outputs,
            cancelled,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one run produced.
///
/// `record` is the durable audit portion appended to history; statuses and
/// outputs let the caller inspect per-node results without parsing logs.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub record: RunRecord,
    pub node_statuses: HashMap<NodeId, NodeStatus>,
    pub outputs: HashMap<NodeId, Value>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        self.record.status
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.record.logs
    }

    /// Log entries emitted by (or about) one node
    pub fn logs_for(&self, node_id: NodeId) -> Vec<&LogEntry> {
        self.record
            .logs
            .iter()
            .filter(|e| e.node_id == Some(node_id))
            .collect()
    }

    pub fn error_entries(&self) -> Vec<&LogEntry> {
        self.record
            .logs
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .collect()
    }
}
