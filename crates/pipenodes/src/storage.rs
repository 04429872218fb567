use async_trait::async_trait;
use pipecore::{kind, BehaviorError, ExecutionContext, NodeBehavior, NodeConfig, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Contract onto the storage collaborator a real sink node would write to.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Writes the records, returning how many were persisted
    async fn write(&self, destination: &str, records: &[Value]) -> Result<usize, BehaviorError>;
}

/// In-process sink retaining everything written, for inspection in tests
/// and demos.
#[derive(Default)]
pub struct MemorySink {
    written: Mutex<Vec<Value>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn written(&self) -> Vec<Value> {
        self.written.lock().await.clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write(&self, _destination: &str, records: &[Value]) -> Result<usize, BehaviorError> {
        let mut written = self.written.lock().await;
        written.extend(records.iter().cloned());
        Ok(records.len())
    }
}

/// Persists upstream records through the configured sink.
pub struct StorageBehavior {
    sink: Arc<dyn RecordSink>,
}

impl StorageBehavior {
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self { sink }
    }
}

impl Default for StorageBehavior {
    fn default() -> Self {
        Self::new(Arc::new(MemorySink::new()))
    }
}

#[async_trait]
impl NodeBehavior for StorageBehavior {
    fn kind(&self) -> &str {
        kind::STORAGE
    }

    fn label(&self) -> &str {
        "Storage"
    }

    fn description(&self) -> &str {
        "Writes incoming records to the configured destination"
    }

    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError> {
        let destination = match &ctx.config {
            NodeConfig::Storage { destination } => destination.clone(),
            _ => "default".to_string(),
        };

        ctx.log.info(format!("opening connection to '{destination}'"));
        ctx.log
            .info(format!("writing {} records", ctx.inputs.len()));
        let written = self.sink.write(&destination, &ctx.inputs).await?;
        ctx.log.success("write confirmed");

        Ok(Value::object([
            ("saved", Value::from(true)),
            ("records", Value::from(written)),
        ]))
    }
}
