use async_trait::async_trait;
use pipecore::{kind, BehaviorError, ExecutionContext, NodeBehavior, NodeConfig, Value};

/// Performs a real HTTP call against the configured method and URL.
pub struct HttpRequestBehavior {
    client: reqwest::Client,
}

impl HttpRequestBehavior {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpRequestBehavior {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeBehavior for HttpRequestBehavior {
    fn kind(&self) -> &str {
        kind::HTTP_REQUEST
    }

    fn label(&self) -> &str {
        "HTTP Request"
    }

    fn description(&self) -> &str {
        "Calls an external HTTP endpoint"
    }

    async fn execute(&self, ctx: ExecutionContext) -> Result<Value, BehaviorError> {
        let (method, url) = match &ctx.config {
            NodeConfig::HttpRequest { method, url } => (method.to_uppercase(), url.clone()),
            _ => {
                return Err(BehaviorError::Configuration(
                    "http request node requires method and url".to_string(),
                ))
            }
        };

        ctx.log.info(format!("{} {}", method, url));

        let request = match method.as_str() {
            "GET" => self.client.get(&url),
            "POST" => {
                let mut req = self.client.post(&url);
                // forward the first upstream value as the request body
                if let Some(body) = ctx.inputs.first() {
                    req = req.json(body);
                }
                req
            }
            "PUT" => {
                let mut req = self.client.put(&url);
                if let Some(body) = ctx.inputs.first() {
                    req = req.json(body);
                }
                req
            }
            "DELETE" => self.client.delete(&url),
            other => {
                return Err(BehaviorError::Configuration(format!(
                    "unsupported method: {other}"
                )))
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| BehaviorError::ExecutionFailed(format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BehaviorError::ExecutionFailed(format!("failed to read body: {e}")))?;

        ctx.log.success(format!("response status {}", status));

        Ok(Value::object([
            ("status", Value::from(status as i64)),
            ("body", Value::from(body)),
        ]))
    }
}
