//! Error types for the pipeline engine.

use std::time::Duration;

use outreach_config::ConfigError;
use thiserror::Error;

use crate::executor::StepOutcome;
use crate::state::SharedState;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure signalled by a step handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// A required configuration value for the step is absent or malformed.
    #[error("missing step configuration: {0}")]
    MissingConfig(String),

    /// A call to an external service failed.
    #[error("{service} error: {message}")]
    External { service: String, message: String },

    /// Any other handler failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    /// Create an external-service error.
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::External {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while building or running a pipeline.
///
/// Execution errors carry the last successfully merged state and the outcomes
/// of the steps that finished, so callers can inspect progress up to the
/// failing step.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The workflow declares no steps, so there is no entry node.
    #[error("Workflow has no steps")]
    EmptyWorkflow,

    /// The workflow is structurally invalid (e.g. duplicate step ids).
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    /// A step handler failed; the run halted at that step.
    #[error("Step '{step_id}' (agent {agent}) failed: {source}")]
    StepFailed {
        step_id: String,
        agent: String,
        #[source]
        source: HandlerError,
        state: SharedState,
        steps: Vec<StepOutcome>,
    },

    /// A step exceeded the configured per-step timeout.
    #[error("Step '{step_id}' timed out after {}s", .timeout.as_secs_f64())]
    StepTimedOut {
        step_id: String,
        timeout: Duration,
        state: SharedState,
        steps: Vec<StepOutcome>,
    },

    /// The run was cancelled before or during a step.
    #[error("Run cancelled at step '{step_id}'")]
    Cancelled {
        step_id: String,
        state: SharedState,
        steps: Vec<StepOutcome>,
    },

    /// The workflow document could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// The step at which execution halted, if this is an execution error.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            PipelineError::StepFailed { step_id, .. }
            | PipelineError::StepTimedOut { step_id, .. }
            | PipelineError::Cancelled { step_id, .. } => Some(step_id),
            _ => None,
        }
    }

    /// State as merged up to (not including) the failing step.
    pub fn partial_state(&self) -> Option<&SharedState> {
        match self {
            PipelineError::StepFailed { state, .. }
            | PipelineError::StepTimedOut { state, .. }
            | PipelineError::Cancelled { state, .. } => Some(state),
            _ => None,
        }
    }

    /// Outcomes of the steps that finished before execution halted. Empty
    /// for build errors.
    pub fn completed_steps(&self) -> &[StepOutcome] {
        match self {
            PipelineError::StepFailed { steps, .. }
            | PipelineError::StepTimedOut { steps, .. }
            | PipelineError::Cancelled { steps, .. } => steps,
            _ => &[],
        }
    }

    /// Take ownership of the salvaged state.
    pub fn into_partial_state(self) -> Option<SharedState> {
        match self {
            PipelineError::StepFailed { state, .. }
            | PipelineError::StepTimedOut { state, .. }
            | PipelineError::Cancelled { state, .. } => Some(state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::StepStatus;
    use crate::state::PartialState;
    use serde_json::json;

    #[test]
    fn test_step_failed_display_names_step_and_cause() {
        let err = PipelineError::StepFailed {
            step_id: "send".into(),
            agent: "OutreachExecutorAgent".into(),
            source: HandlerError::external("SendGrid", "401 Unauthorized"),
            state: SharedState::new(),
            steps: Vec::new(),
        };
        let msg = err.to_string();
        assert!(msg.contains("send"));
        assert!(msg.contains("SendGrid error: 401 Unauthorized"));
        assert_eq!(err.step_id(), Some("send"));
    }

    #[test]
    fn test_partial_state_exposed() {
        let mut state = SharedState::new();
        state.merge(PartialState::new().with("leads", json!([1])));
        let err = PipelineError::Cancelled {
            step_id: "score".into(),
            state,
            steps: vec![StepOutcome {
                step_id: "search".into(),
                agent: "ProspectSearchAgent".into(),
                status: StepStatus::Completed {
                    keys: vec!["leads".into()],
                },
                duration_ms: 3,
            }],
        };
        assert_eq!(err.partial_state().unwrap().records("leads").len(), 1);
        assert_eq!(err.completed_steps().len(), 1);
        assert_eq!(err.completed_steps()[0].step_id, "search");
        assert!(err.into_partial_state().is_some());
    }

    #[test]
    fn test_build_errors_have_no_state() {
        assert!(PipelineError::EmptyWorkflow.partial_state().is_none());
        assert!(PipelineError::EmptyWorkflow.step_id().is_none());
        assert!(PipelineError::EmptyWorkflow.completed_steps().is_empty());
        assert_eq!(PipelineError::EmptyWorkflow.to_string(), "Workflow has no steps");
    }

    #[test]
    fn test_timeout_display() {
        let err = PipelineError::StepTimedOut {
            step_id: "track".into(),
            timeout: Duration::from_millis(1500),
            state: SharedState::new(),
            steps: Vec::new(),
        };
        assert_eq!(err.to_string(), "Step 'track' timed out after 1.5s");
    }
}
