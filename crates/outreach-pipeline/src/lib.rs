//! Linear step pipeline engine for the outreach workflow.
//!
//! A declarative workflow document becomes an executable chain of steps that
//! run one after another against a shared, accumulating state.
//!
//! # Architecture
//!
//! ```text
//! WorkflowDocument ──▶ PipelineBuilder ──▶ Pipeline
//!                      (HandlerRegistry)      │
//!                                             ▼
//! SharedState ─────────────────────────▶ Executor ──▶ RunReport
//! ```
//!
//! - Handlers see `&SharedState` and return a `PartialState`
//! - The executor merges by wholesale key replacement
//! - Each step runs under an optional timeout and a cancellation token

pub mod error;
pub mod executor;
pub mod graph;
pub mod handler;
pub mod registry;
pub mod state;

pub use error::{HandlerError, PipelineError, Result};
pub use executor::{Executor, ExecutorConfig, RunReport, StepOutcome, StepStatus};
pub use graph::{Edge, EdgeTarget, Pipeline, PipelineBuilder, PipelineNode};
pub use handler::{FnHandler, PlaceholderHandler, StepContext, StepHandler, handler_fn};
pub use registry::HandlerRegistry;
pub use state::{PartialState, SharedState};

pub use outreach_config::{StepDeclaration, WorkflowDocument};
pub use tokio_util::sync::CancellationToken;
