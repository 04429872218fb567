use async_trait::async_trait;
use chrono::Utc;
use pipecore::{kind, BehaviorError, ExecutionContext, NodeBehavior, NodeConfig, Value};

/// Logical trigger node. The cron expression in its config is descriptive
/// metadata for the editing surface; the engine never schedules wall-clock
/// firing from it.
pub struct TimerBehavior;

#[async_trait]
impl NodeBehavior for TimerBehavior {
    fn kind(&self) -> &str {
        kind::TIMER
    }

    fn label(&self) -> &str {
        "Timer"
    }

    fn description(&self) -> &str {
        "Starts the pipeline on a schedule"
    }

    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError> {
        let cron = match &ctx.config {
            NodeConfig::Timer { cron } => cron.as_str(),
            _ => "* * * * *",
        };
        let now = Utc::now();
        ctx.log
            .success(format!("triggered at {} (schedule: {})", now.to_rfc3339(), cron));

        Ok(Value::object([
            ("timestamp", Value::from(now.to_rfc3339())),
            ("trigger", Value::from("cron")),
        ]))
    }
}
