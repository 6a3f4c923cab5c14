//! Step handler framework.
//!
//! Every step in a workflow is bound to a [`StepHandler`] resolved by the
//! step's `agent` name. A handler receives a read-only view of the shared
//! state plus its own step declaration, and returns the fields it wants to set.
//!
//! # Contract
//!
//! - Never mutate shared state; return a [`PartialState`] instead. Clone any
//!   records you need to modify.
//! - Returned keys **replace** existing state entries wholesale. Returning
//!   `{"leads": [...]}` discards whatever `leads` held before.
//! - Missing upstream input is not an error: log a skip and return an empty
//!   partial state.
//! - Convert recoverable failures (bad optional config, a failed third-party
//!   call) into partial results plus a log line. Return `Err` only when the run
//!   cannot sensibly continue.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Echo;
//!
//! #[async_trait]
//! impl StepHandler for Echo {
//!     async fn handle(&self, _state: &SharedState, step: &StepDeclaration, _ctx: &StepContext)
//!         -> Result<PartialState, HandlerError>
//!     {
//!         Ok(PartialState::new().with("echo", json!(step.id)))
//!     }
//! }
//! ```

use async_trait::async_trait;
use outreach_config::StepDeclaration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::state::{PartialState, SharedState};

/// Business logic bound to a step's `agent` name.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Run the step against the current state snapshot.
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        ctx: &StepContext,
    ) -> Result<PartialState, HandlerError>;

    /// Whether this is the fallback used for unregistered agents.
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// Per-invocation context passed to handlers by the executor.
#[derive(Debug, Clone)]
pub struct StepContext {
    /// ID of the run this step belongs to.
    pub run_id: Uuid,
    /// Zero-based position of the step in the pipeline.
    pub step_index: usize,
    /// Token that is cancelled when the run is aborted or the step times out.
    pub cancellation: CancellationToken,
}

impl StepContext {
    pub fn new(run_id: Uuid, step_index: usize, cancellation: CancellationToken) -> Self {
        Self {
            run_id,
            step_index,
            cancellation,
        }
    }

    /// A context not tied to any run, for calling handlers directly.
    pub fn detached() -> Self {
        Self::new(Uuid::new_v4(), 0, CancellationToken::new())
    }

    /// Whether the run has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Placeholder
// ─────────────────────────────────────────────────────────────────────────────

/// No-op handler for agent names with no registered implementation.
///
/// Always succeeds with an empty partial state, so a partially implemented
/// workflow still runs end to end.
#[derive(Debug, Clone)]
pub struct PlaceholderHandler {
    agent: String,
}

impl PlaceholderHandler {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
        }
    }

    /// The agent name this placeholder stands in for.
    pub fn agent(&self) -> &str {
        &self.agent
    }
}

#[async_trait]
impl StepHandler for PlaceholderHandler {
    async fn handle(
        &self,
        _state: &SharedState,
        step: &StepDeclaration,
        _ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        warn!(
            step_id = %step.id,
            agent = %self.agent,
            "Skipping step: agent not implemented"
        );
        Ok(PartialState::new())
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Closure adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Handler backed by a synchronous closure.
pub struct FnHandler<F> {
    f: F,
}

/// Wrap a closure as a [`StepHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&SharedState, &StepDeclaration) -> Result<PartialState, HandlerError> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> StepHandler for FnHandler<F>
where
    F: Fn(&SharedState, &StepDeclaration) -> Result<PartialState, HandlerError> + Send + Sync,
{
    async fn handle(
        &self,
        state: &SharedState,
        step: &StepDeclaration,
        _ctx: &StepContext,
    ) -> Result<PartialState, HandlerError> {
        (self.f)(state, step)
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}
