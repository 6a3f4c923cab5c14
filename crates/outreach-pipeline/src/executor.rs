//! Sequential pipeline executor.
//!
//! Walks a [`Pipeline`] from its entry node to `END`. For each node it invokes
//! the bound handler with the current state snapshot and that node's
//! declaration, merges the returned partial state (wholesale key
//! replacement), and follows the node's single outgoing edge.
//!
//! Steps never overlap: a step starts only after the previous step's merge
//! completes, because any step may read any field written earlier.
//!
//! Failures halt the run at the failing node. The returned error names the
//! node and carries the state merged so far along with the outcomes of the
//! steps that finished before it. Side effects already performed
//! by earlier handlers are not rolled back.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{HandlerError, PipelineError, Result};
use crate::graph::{EdgeTarget, Pipeline, PipelineNode};
use crate::handler::StepContext;
use crate::state::{PartialState, SharedState};

/// Configuration for the executor.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Maximum time a single step may run. `None` waits indefinitely.
    pub step_timeout: Option<Duration>,
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// The handler returned a non-empty update; `keys` were written.
    Completed { keys: Vec<String> },
    /// The handler found nothing to do and returned an empty update.
    Skipped,
    /// No handler was registered for the agent; the placeholder ran.
    Placeholder,
}

/// Per-step record in a [`RunReport`].
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step_id: String,
    pub agent: String,
    #[serde(flatten)]
    pub status: StepStatus,
    pub duration_ms: u64,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique ID for this run.
    pub run_id: Uuid,
    /// Workflow name.
    pub workflow: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Outcomes in execution order.
    pub steps: Vec<StepOutcome>,
    /// Final merged state.
    pub state: SharedState,
}

impl RunReport {
    /// Ids of steps that ran the placeholder handler.
    pub fn placeholder_steps(&self) -> Vec<&str> {
        self.steps_with(|s| matches!(s, StepStatus::Placeholder))
    }

    /// Ids of steps whose handler returned nothing.
    pub fn skipped_steps(&self) -> Vec<&str> {
        self.steps_with(|s| matches!(s, StepStatus::Skipped))
    }

    /// Outcome for a step id.
    pub fn outcome(&self, step_id: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|o| o.step_id == step_id)
    }

    fn steps_with(&self, pred: impl Fn(&StepStatus) -> bool) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|o| pred(&o.status))
            .map(|o| o.step_id.as_str())
            .collect()
    }
}

/// Why a step did not produce a partial state.
enum Interruption {
    Handler(HandlerError),
    TimedOut(Duration),
    Cancelled,
}

/// Runs pipelines one step at a time.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
    cancellation: CancellationToken,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token (e.g. wired to Ctrl-C).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that aborts the current and any future runs when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run a pipeline to completion.
    pub async fn run(&self, pipeline: &Pipeline, initial: SharedState) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut state = initial;
        let mut steps = Vec::with_capacity(pipeline.len());

        info!(
            run_id = %run_id,
            workflow = %pipeline.name(),
            steps = pipeline.len(),
            "Starting pipeline run"
        );

        let mut cursor = EdgeTarget::Node(pipeline.entry().to_string());
        while let EdgeTarget::Node(step_id) = cursor {
            let index = pipeline.position(&step_id).ok_or_else(|| {
                PipelineError::InvalidWorkflow(format!("Edge points to unknown step '{}'", step_id))
            })?;
            let node = &pipeline.nodes()[index];

            if self.cancellation.is_cancelled() {
                info!(run_id = %run_id, step_id = %step_id, "Run cancelled before step");
                return Err(PipelineError::Cancelled {
                    step_id,
                    state,
                    steps,
                });
            }

            let ctx = StepContext::new(run_id, index, self.cancellation.child_token());
            debug!(run_id = %run_id, step_id = %step_id, agent = %node.agent(), index, "Executing step");

            let started = Instant::now();
            let partial = match self.invoke(node, &state, &ctx).await {
                Ok(partial) => partial,
                Err(interruption) => {
                    return Err(self.halt(run_id, node, interruption, state, steps));
                }
            };
            let duration_ms = started.elapsed().as_millis() as u64;

            let status = if node.is_placeholder() {
                StepStatus::Placeholder
            } else if partial.is_empty() {
                info!(run_id = %run_id, step_id = %step_id, agent = %node.agent(), "Step skipped: nothing to do");
                StepStatus::Skipped
            } else {
                let keys = state.merge(partial);
                info!(
                    run_id = %run_id,
                    step_id = %step_id,
                    agent = %node.agent(),
                    keys = ?keys,
                    duration_ms,
                    "Step completed"
                );
                StepStatus::Completed { keys }
            };

            steps.push(StepOutcome {
                step_id,
                agent: node.agent().to_string(),
                status,
                duration_ms,
            });

            cursor = pipeline.edges()[index].to.clone();
        }

        let finished_at = Utc::now();
        info!(
            run_id = %run_id,
            workflow = %pipeline.name(),
            fields = state.len(),
            "Pipeline run complete"
        );

        Ok(RunReport {
            run_id,
            workflow: pipeline.name().to_string(),
            started_at,
            finished_at,
            steps,
            state,
        })
    }

    /// Invoke one handler, enforcing cancellation and the step timeout.
    async fn invoke(
        &self,
        node: &PipelineNode,
        state: &SharedState,
        ctx: &StepContext,
    ) -> std::result::Result<PartialState, Interruption> {
        let guarded = async {
            tokio::select! {
                biased;
                _ = ctx.cancellation.cancelled() => Err(Interruption::Cancelled),
                result = node.handler().handle(state, node.step(), ctx) => {
                    result.map_err(Interruption::Handler)
                }
            }
        };

        match self.config.step_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(result) => result,
                Err(_) => {
                    ctx.cancellation.cancel();
                    Err(Interruption::TimedOut(limit))
                }
            },
            None => guarded.await,
        }
    }

    fn halt(
        &self,
        run_id: Uuid,
        node: &PipelineNode,
        interruption: Interruption,
        state: SharedState,
        steps: Vec<StepOutcome>,
    ) -> PipelineError {
        let step_id = node.id().to_string();
        match interruption {
            Interruption::Handler(source) => {
                error!(
                    run_id = %run_id,
                    step_id = %step_id,
                    agent = %node.agent(),
                    error = %source,
                    "Step failed; halting run"
                );
                PipelineError::StepFailed {
                    step_id,
                    agent: node.agent().to_string(),
                    source,
                    state,
                    steps,
                }
            }
            Interruption::TimedOut(timeout) => {
                error!(
                    run_id = %run_id,
                    step_id = %step_id,
                    timeout_secs = timeout.as_secs_f64(),
                    "Step timed out; halting run"
                );
                PipelineError::StepTimedOut {
                    step_id,
                    timeout,
                    state,
                    steps,
                }
            }
            Interruption::Cancelled => {
                info!(run_id = %run_id, step_id = %step_id, "Run cancelled during step");
                PipelineError::Cancelled {
                    step_id,
                    state,
                    steps,
                }
            }
        }
    }
}
