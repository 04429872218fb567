use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pipecore::{
    kind, DependencyGraph, LogLevel, NodeConfig, NodeSpec, RunStatus, Workflow,
};
use pipenodes::register_builtin;
use piperuntime::{BehaviorRegistry, PipelineRuntime, RuntimeConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pipectl")]
#[command(about = "Pipeline engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file and print its run record
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Cancel the run after this many milliseconds
        #[arg(long)]
        cancel_after_ms: Option<u64>,
    },

    /// Validate a workflow file without running it
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Write the example Daily Data Sync workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

fn build_runtime() -> PipelineRuntime {
    let mut registry = BehaviorRegistry::new();
    register_builtin(&mut registry);
    PipelineRuntime::with_registry(Arc::new(registry), RuntimeConfig::default())
}

fn load_workflow(path: &PathBuf) -> Result<Workflow> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading workflow file {}", path.display()))?;
    serde_json::from_str(&raw).context("parsing workflow JSON")
}

/// TIMER -> SCRIPT -> STORAGE
fn daily_data_sync() -> Result<Workflow> {
    let mut wf = Workflow::new("Daily Data Sync")
        .with_description("Fetch, process, and archive the daily data set");
    let timer = wf.add_node(
        NodeSpec::new(kind::TIMER)
            .with_label("Daily Trigger")
            .with_config(NodeConfig::Timer {
                cron: "0 9 * * *".to_string(),
            })
            .with_position(80.0, 120.0),
    );
    let script = wf.add_node(
        NodeSpec::new(kind::SCRIPT)
            .with_label("Normalize Records")
            .with_config(NodeConfig::Script {
                source: "return input".to_string(),
            })
            .with_position(320.0, 120.0),
    );
    let storage = wf.add_node(
        NodeSpec::new(kind::STORAGE)
            .with_label("Archive")
            .with_config(NodeConfig::Storage {
                destination: "warehouse".to_string(),
            })
            .with_position(560.0, 120.0),
    );
    wf.connect(timer, script)?;
    wf.connect(script, storage)?;
    Ok(wf)
}

fn status_tag(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Success => "success",
        RunStatus::Failed => "failed",
    }
}

fn level_tag(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "INFO",
        LogLevel::Success => "OK",
        LogLevel::Warn => "WARN",
        LogLevel::Error => "ERROR",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            file,
            cancel_after_ms,
        } => {
            let workflow = load_workflow(&file)?;
            let runtime = build_runtime();
            tracing::info!(workflow = %workflow.name, file = %file.display(), "executing workflow");

            let token = CancellationToken::new();
            if let Some(ms) = cancel_after_ms {
                let token = token.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    token.cancel();
                });
            }

            let report = runtime.run_with_cancellation(&workflow, token).await?;
            let record = &report.record;
            tracing::info!(run_id = %record.id, status = ?record.status, "run complete");

            println!("run {}", record.id);
            println!(
                "status: {}  duration: {}ms",
                status_tag(record.status),
                record.duration_ms
            );
            for entry in &record.logs {
                let node = entry
                    .node_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "engine".to_string());
                println!(
                    "{} [{:<5}] {}  {}",
                    entry.timestamp.format("%H:%M:%S%.3f"),
                    level_tag(entry.level),
                    node,
                    entry.message
                );
            }
            let history = runtime.history().list().await;
            println!("history: {} run(s) recorded", history.len());
            for past in &history {
                println!(
                    "  {}  {}  {}ms  {} log entries",
                    past.id,
                    status_tag(past.status),
                    past.duration_ms,
                    past.logs.len()
                );
            }

            if record.status == RunStatus::Failed {
                std::process::exit(1);
            }
        }

        Commands::Validate { file } => {
            let workflow = load_workflow(&file)?;
            let graph = DependencyGraph::build(&workflow)?;
            let order = graph.topological_order()?;
            println!(
                "workflow '{}' is valid: {} nodes, {} connections",
                workflow.name,
                workflow.nodes.len(),
                workflow.connections.len()
            );
            for (i, id) in order.iter().enumerate() {
                let label = workflow
                    .find_node(*id)
                    .map(|n| n.label.as_str())
                    .unwrap_or("?");
                println!("  {}. {}", i + 1, label);
            }
        }

        Commands::Nodes => {
            let runtime = build_runtime();
            println!("registered node types:");
            for kind in runtime.registry().kinds() {
                println!("  {kind}");
            }
            println!("(any other tag resolves to the pass-through behavior)");
        }

        Commands::Init { output } => {
            let workflow = daily_data_sync()?;
            let json = serde_json::to_string_pretty(&workflow)?;
            std::fs::write(&output, json)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("wrote example workflow to {}", output.display());
        }
    }

    Ok(())
}
