//! Run command - executes the workflow end to end.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use console::{Style, style};
use outreach_config::step_timeout_from_secs;
use outreach_pipeline::{
    Executor, ExecutorConfig, RunReport, SharedState, StepOutcome, StepStatus,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{Context, prepare};

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Workflow document (JSON or TOML); defaults to the configured workflow
    #[arg(short, long)]
    pub workflow: Option<PathBuf>,

    /// JSON file with the initial state object
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Per-step timeout in seconds, 0 for none (overrides settings)
    #[arg(short, long)]
    pub timeout: Option<u64>,
}

/// Failed-run output for JSON mode.
#[derive(Debug, Serialize)]
struct FailureOutput<'a> {
    error: String,
    step_id: Option<&'a str>,
    completed_steps: &'a [StepOutcome],
    state: Option<&'a SharedState>,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let path = ctx.workflow_path(args.workflow);
    let (_loaded, pipeline) = prepare(ctx, &path)?;

    let initial = match &args.state {
        Some(state_path) => read_initial_state(state_path)?,
        None => SharedState::new(),
    };

    let config = ExecutorConfig {
        step_timeout: match args.timeout {
            Some(secs) => step_timeout_from_secs(secs),
            None => ctx.config.step_timeout(),
        },
    };
    let executor = Executor::new(config);

    let token = executor.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling run");
            token.cancel();
        }
    });

    match executor.run(&pipeline, initial).await {
        Ok(report) => {
            info!(run_id = %report.run_id, steps = report.steps.len(), "Run finished");
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
                println!("{}", serde_json::to_string_pretty(&report.state)?);
            }
            Ok(())
        }
        Err(e) => {
            if ctx.json_output {
                let output = FailureOutput {
                    error: e.to_string(),
                    step_id: e.step_id(),
                    completed_steps: e.completed_steps(),
                    state: e.partial_state(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if let Some(state) = e.partial_state() {
                let dim = Style::new().dim();
                eprintln!("{}", dim.apply_to("State before the failing step:"));
                println!("{}", serde_json::to_string_pretty(state)?);
            }
            Err(e.into())
        }
    }
}

fn read_initial_state(path: &Path) -> Result<SharedState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read initial state from {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Initial state in {} is not valid JSON", path.display()))?;
    SharedState::try_from(value).map_err(|e| anyhow!("Invalid initial state: {}", e))
}

/// Per-step summary on stderr, so stdout stays pipeable JSON.
fn print_summary(report: &RunReport) {
    let green = Style::new().green();
    let yellow = Style::new().yellow();
    let dim = Style::new().dim();

    eprintln!();
    eprintln!("{} {}", style("Workflow").bold(), report.workflow);
    eprintln!("{}", dim.apply_to("─".repeat(40)));
    for step in &report.steps {
        let (marker, detail) = match &step.status {
            StepStatus::Completed { keys } => {
                (green.apply_to("●"), format!("wrote {}", keys.join(", ")))
            }
            StepStatus::Skipped => (dim.apply_to("○"), "nothing to do".to_string()),
            StepStatus::Placeholder => (yellow.apply_to("○"), "agent not implemented".to_string()),
        };
        eprintln!(
            "  {} {} {} {}",
            marker,
            step.step_id,
            dim.apply_to(format!("({}, {}ms)", step.agent, step.duration_ms)),
            detail
        );
    }
    eprintln!();
}
