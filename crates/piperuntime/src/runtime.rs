use crate::engine::{Engine, RunReport};
use crate::history::RunHistory;
use crate::registry::BehaviorRegistry;
use pipecore::{EngineError, EventBus, RunEvent, Workflow, WorkflowId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Main entry point tying registry, engine, event bus, and history
/// together. Concurrent runs share nothing mutable except the bus and the
/// append-only history.
pub struct PipelineRuntime {
    registry: Arc<BehaviorRegistry>,
    engine: Engine,
    event_bus: Arc<EventBus>,
    history: Arc<RunHistory>,
    workflows: Arc<RwLock<HashMap<WorkflowId, Workflow>>>,
}

impl PipelineRuntime {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(BehaviorRegistry::new()), RuntimeConfig::default())
    }

    pub fn with_registry(registry: Arc<BehaviorRegistry>, config: RuntimeConfig) -> Self {
        Self {
            registry,
            engine: Engine::new(),
            event_bus: Arc::new(EventBus::new(config.event_buffer_size)),
            history: Arc::new(RunHistory::new()),
            workflows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &Arc<BehaviorRegistry> {
        &self.registry
    }

    pub fn history(&self) -> &Arc<RunHistory> {
        &self.history
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<RunEvent> {
        self.event_bus.subscribe()
    }

    pub async fn register_workflow(&self, workflow: Workflow) {
        let mut workflows = self.workflows.write().await;
        workflows.insert(workflow.id, workflow);
    }

    /// Runs a previously registered workflow by id.
    pub async fn run_workflow(&self, workflow_id: WorkflowId) -> Result<RunReport, EngineError> {
        let workflow = {
            let workflows = self.workflows.read().await;
            workflows
                .get(&workflow_id)
                .cloned()
                .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?
        };
        self.run(&workflow).await
    }

    /// Runs a workflow snapshot directly, without registration.
    pub async fn run(&self, workflow: &Workflow) -> Result<RunReport, EngineError> {
        self.run_with_cancellation(workflow, CancellationToken::new())
            .await
    }

    /// Runs a snapshot under a caller-owned cancellation token. Once the
    /// token is cancelled, no further node is dispatched; the in-flight
    /// node finishes and the run is recorded as failed.
    pub async fn run_with_cancellation(
        &self,
        workflow: &Workflow,
        cancellation: CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let report = self
            .engine
            .execute(workflow, &self.registry, &self.event_bus, cancellation)
            .await?;
        self.history.append(report.record.clone()).await;
        Ok(report)
    }
}

impl Default for PipelineRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime tuning knobs
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1024,
        }
    }
}
