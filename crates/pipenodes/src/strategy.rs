use async_trait::async_trait;
use pipecore::{kind, BehaviorError, ExecutionContext, NodeBehavior, NodeConfig, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trading signal produced by a strategy evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub action: SignalAction,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
        }
    }
}

/// Contract onto the model-inference collaborator behind the AI-assisted
/// strategy node. The real inference service is out of scope.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    async fn evaluate(&self, model: &str, inputs: &[Value]) -> Result<Signal, BehaviorError>;
}

/// Default provider: a fixed rule over the input count, so repeated runs
/// of the same snapshot produce the same signal.
pub struct HeuristicSignalProvider;

#[async_trait]
impl SignalProvider for HeuristicSignalProvider {
    async fn evaluate(&self, _model: &str, inputs: &[Value]) -> Result<Signal, BehaviorError> {
        tokio::task::yield_now().await;
        let action = if inputs.len() % 2 == 0 {
            SignalAction::Buy
        } else {
            SignalAction::Sell
        };
        let confidence = 0.5 + (inputs.len().min(40) as f64) / 100.0;
        Ok(Signal { action, confidence })
    }
}

/// AI-assisted strategy node: evaluates upstream data into a BUY/SELL
/// signal with a confidence score.
pub struct StrategyBehavior {
    provider: Arc<dyn SignalProvider>,
}

impl StrategyBehavior {
    pub fn new(provider: Arc<dyn SignalProvider>) -> Self {
        Self { provider }
    }
}

impl Default for StrategyBehavior {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicSignalProvider))
    }
}

#[async_trait]
impl NodeBehavior for StrategyBehavior {
    fn kind(&self) -> &str {
        kind::STRATEGY
    }

    fn label(&self) -> &str {
        "Strategy"
    }

    fn description(&self) -> &str {
        "Evaluates inputs into a trading signal"
    }

    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError> {
        let model = match &ctx.config {
            NodeConfig::Strategy { model, .. } => model.clone(),
            _ => "baseline".to_string(),
        };

        ctx.log.info(format!("loading strategy model '{model}'"));
        ctx.log
            .info(format!("evaluating {} input records", ctx.inputs.len()));
        let signal = self.provider.evaluate(&model, &ctx.inputs).await?;
        ctx.log.success(format!(
            "signal ready: {} ({:.2})",
            signal.action.as_str(),
            signal.confidence
        ));

        Ok(Value::object([
            ("signal", Value::from(signal.action.as_str())),
            ("confidence", Value::from(signal.confidence)),
        ]))
    }
}
