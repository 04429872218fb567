use async_trait::async_trait;
use pipecore::{kind, BehaviorError, ExecutionContext, NodeBehavior, NodeConfig, Value};
use std::sync::Arc;

/// Narrow contract onto the external data collaborator a real database
/// query node would call. The query engine itself is out of scope.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn fetch(&self, query: &str, limit: Option<u64>) -> Result<Vec<Value>, BehaviorError>;
}

/// Default backend serving a fixed row set, truncated to the requested
/// limit. Keeps the behavior runnable (and deterministic) without a
/// database.
pub struct StaticQueryBackend {
    rows: Vec<Value>,
}

impl StaticQueryBackend {
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }

    /// Synthetic OHLC-shaped rows, `count` of them
    pub fn with_sample_rows(count: usize) -> Self {
        let rows = (0..count)
            .map(|i| {
                Value::object([
                    ("id", Value::from(i)),
                    ("open", Value::from(100.0 + i as f64)),
                    ("close", Value::from(100.5 + i as f64)),
                ])
            })
            .collect();
        Self::new(rows)
    }
}

#[async_trait]
impl QueryBackend for StaticQueryBackend {
    async fn fetch(&self, _query: &str, limit: Option<u64>) -> Result<Vec<Value>, BehaviorError> {
        let mut rows = self.rows.clone();
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }
}

/// Fetches rows through the query backend and forwards them downstream.
pub struct DatabaseQueryBehavior {
    backend: Arc<dyn QueryBackend>,
}

impl DatabaseQueryBehavior {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self { backend }
    }
}

impl Default for DatabaseQueryBehavior {
    fn default() -> Self {
        Self::new(Arc::new(StaticQueryBackend::with_sample_rows(25)))
    }
}

#[async_trait]
impl NodeBehavior for DatabaseQueryBehavior {
    fn kind(&self) -> &str {
        kind::DATABASE_QUERY
    }

    fn label(&self) -> &str {
        "Database Query"
    }

    fn description(&self) -> &str {
        "Fetches rows from the configured data source"
    }

    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError> {
        let (query, limit) = match &ctx.config {
            NodeConfig::DatabaseQuery { query, limit } => (query.as_str(), *limit),
            _ => ("SELECT 1", None),
        };

        ctx.log.info("connecting to data source");
        let rows = self.backend.fetch(query, limit).await?;
        ctx.log.success(format!("fetched {} rows", rows.len()));

        Ok(Value::object([
            ("rows", Value::from(rows.len())),
            ("data", Value::Array(rows)),
        ]))
    }
}
