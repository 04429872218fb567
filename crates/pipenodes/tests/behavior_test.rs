use pipecore::{
    BehaviorError, EventBus, ExecutionContext, LogLevel, NodeBehavior, NodeConfig, RunLog, Value,
};
use pipenodes::{
    DatabaseQueryBehavior, HttpRequestBehavior, MemorySink, ScriptBehavior, StaticQueryBackend,
    StorageBehavior, StrategyBehavior, TimerBehavior,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// Helper to build a context around a fresh run log
fn test_context(config: NodeConfig, inputs: Vec<Value>) -> (ExecutionContext, RunLog) {
    let bus = EventBus::new(64);
    let run_log = RunLog::new();
    let node_id = uuid::Uuid::new_v4();
    let ctx = ExecutionContext {
        node_id,
        inputs,
        config,
        log: bus.logger(run_log.clone(), Some(node_id)),
        cancellation: CancellationToken::new(),
    };
    (ctx, run_log)
}

fn levels(run_log: &RunLog) -> Vec<LogLevel> {
    run_log.snapshot().iter().map(|e| e.level).collect()
}

#[tokio::test]
async fn timer_emits_one_success_log_and_trigger_output() {
    let (ctx, run_log) = test_context(
        NodeConfig::Timer {
            cron: "0 9 * * *".to_string(),
        },
        vec![Value::from("ignored")],
    );

    let output = TimerBehavior.execute(ctx).await.unwrap();

    assert_eq!(levels(&run_log), vec![LogLevel::Success]);
    assert_eq!(output.get("trigger").and_then(Value::as_str), Some("cron"));
    assert!(output.get("timestamp").is_some());
}

#[tokio::test]
async fn query_logs_connect_then_fetched() {
    let behavior =
        DatabaseQueryBehavior::new(Arc::new(StaticQueryBackend::with_sample_rows(10)));
    let (ctx, run_log) = test_context(
        NodeConfig::DatabaseQuery {
            query: "SELECT * FROM candles".to_string(),
            limit: Some(4),
        },
        vec![],
    );

    let output = behavior.execute(ctx).await.unwrap();

    let entries = run_log.snapshot();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].message.contains("connecting"));
    assert!(entries[1].message.contains("fetched 4 rows"));
    assert_eq!(output.get("rows").and_then(Value::as_f64), Some(4.0));
    assert_eq!(
        output.get("data").and_then(Value::as_array).map(<[Value]>::len),
        Some(4)
    );
}

#[tokio::test]
async fn query_surfaces_backend_failure() {
    struct DownBackend;

    #[async_trait::async_trait]
    impl pipenodes::QueryBackend for DownBackend {
        async fn fetch(
            &self,
            _query: &str,
            _limit: Option<u64>,
        ) -> Result<Vec<Value>, BehaviorError> {
            Err(BehaviorError::BackendUnavailable(
                "connection refused".to_string(),
            ))
        }
    }

    let behavior = DatabaseQueryBehavior::new(Arc::new(DownBackend));
    let (ctx, run_log) = test_context(
        NodeConfig::DatabaseQuery {
            query: "SELECT 1".to_string(),
            limit: None,
        },
        vec![],
    );

    let err = behavior.execute(ctx).await.unwrap_err();
    assert!(matches!(err, BehaviorError::BackendUnavailable(_)));
    // the "connecting" entry was already emitted before the failure
    assert_eq!(run_log.len(), 1);
}

#[tokio::test]
async fn script_counts_and_forwards_inputs() {
    let inputs = vec![Value::from(1i64), Value::from(2i64), Value::from(3i64)];
    let (ctx, run_log) = test_context(
        NodeConfig::Script {
            source: "return input".to_string(),
        },
        inputs.clone(),
    );

    let output = ScriptBehavior.execute(ctx).await.unwrap();

    let entries = run_log.snapshot();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].message.contains("compiling"));
    assert!(entries[1].message.contains("processing 3 input records"));
    assert!(entries[2].message.contains("done"));
    assert_eq!(output.get("processed").and_then(Value::as_bool), Some(true));
    assert_eq!(output.get("count").and_then(Value::as_f64), Some(3.0));
    assert_eq!(output.get("data"), Some(&Value::Array(inputs)));
}

#[tokio::test]
async fn script_with_no_inputs_yields_empty_data_not_null() {
    let (ctx, _log) = test_context(NodeConfig::default(), vec![]);

    let output = ScriptBehavior.execute(ctx).await.unwrap();

    let data = output.get("data").unwrap();
    assert_eq!(data, &Value::Array(vec![]));
    assert!(!data.is_null());
}

#[tokio::test]
async fn strategy_signal_is_deterministic_for_fixed_inputs() {
    let inputs = vec![Value::from(1i64), Value::from(2i64)];

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let (ctx, run_log) = test_context(
            NodeConfig::Strategy {
                model: "momentum-v1".to_string(),
                prompt: String::new(),
            },
            inputs.clone(),
        );
        let output = StrategyBehavior::default().execute(ctx).await.unwrap();
        assert_eq!(run_log.len(), 3);
        outputs.push(output);
    }

    assert_eq!(outputs[0], outputs[1]);
    let signal = outputs[0].get("signal").and_then(Value::as_str).unwrap();
    assert!(signal == "BUY" || signal == "SELL");
}

#[tokio::test]
async fn storage_writes_through_sink() {
    let sink = Arc::new(MemorySink::new());
    let behavior = StorageBehavior::new(sink.clone());
    let inputs = vec![Value::from("a"), Value::from("b")];
    let (ctx, run_log) = test_context(
        NodeConfig::Storage {
            destination: "candles_archive".to_string(),
        },
        inputs.clone(),
    );

    let output = behavior.execute(ctx).await.unwrap();

    let entries = run_log.snapshot();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].message.contains("opening connection"));
    assert!(entries[1].message.contains("writing 2 records"));
    assert!(entries[2].message.contains("write confirmed"));
    assert_eq!(output.get("saved").and_then(Value::as_bool), Some(true));
    assert_eq!(output.get("records").and_then(Value::as_f64), Some(2.0));
    assert_eq!(sink.written().await, inputs);
}

#[tokio::test]
async fn http_request_rejects_missing_config() {
    let (ctx, run_log) = test_context(NodeConfig::default(), vec![]);

    let err = HttpRequestBehavior::new().execute(ctx).await.unwrap_err();
    assert!(matches!(err, BehaviorError::Configuration(_)));
    assert!(run_log.is_empty());
}

#[tokio::test]
async fn http_request_rejects_unsupported_method() {
    let (ctx, run_log) = test_context(
        NodeConfig::HttpRequest {
            method: "TRACE".to_string(),
            url: "http://localhost/ping".to_string(),
        },
        vec![],
    );

    let err = HttpRequestBehavior::new().execute(ctx).await.unwrap_err();
    assert!(matches!(err, BehaviorError::Configuration(_)));
    // method+url line is logged before the method is validated
    assert_eq!(run_log.len(), 1);
}
