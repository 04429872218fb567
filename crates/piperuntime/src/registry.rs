use async_trait::async_trait;
use pipecore::{BehaviorError, ExecutionContext, NodeBehavior, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of runtime behaviors, keyed by node type tag.
///
/// Resolution never fails: tags with no registered behavior resolve to the
/// pass-through fallback, so unknown or legacy node types cannot abort a
/// run.
pub struct BehaviorRegistry {
    behaviors: HashMap<String, Arc<dyn NodeBehavior>>,
    fallback: Arc<dyn NodeBehavior>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            fallback: Arc::new(Passthrough),
        }
    }

    pub fn register(&mut self, behavior: Arc<dyn NodeBehavior>) {
        let kind = behavior.kind().to_string();
        tracing::info!(kind = %kind, "registering node behavior");
        self.behaviors.insert(kind, behavior);
    }

    pub fn resolve(&self, kind: &str) -> Arc<dyn NodeBehavior> {
        match self.behaviors.get(kind) {
            Some(behavior) => Arc::clone(behavior),
            None => {
                tracing::debug!(kind, "no registered behavior, using pass-through");
                Arc::clone(&self.fallback)
            }
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.behaviors.contains_key(kind)
    }

    /// Registered tags, sorted for stable listings
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.behaviors.keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity behavior for unregistered type tags: forwards inputs unchanged,
/// emits no log entries, always succeeds.
struct Passthrough;

#[async_trait]
impl NodeBehavior for Passthrough {
    fn kind(&self) -> &str {
        "PASSTHROUGH"
    }

    fn description(&self) -> &str {
        "Forwards inputs unchanged"
    }

    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError> {
        Ok(Value::Array(ctx.inputs))
    }
}
