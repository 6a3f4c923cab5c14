//! Pipeline graph construction.
//!
//! Turns an ordered list of step declarations into an executable chain:
//!
//! ```text
//! entry
//!   │
//!   ▼
//! steps[0] ──▶ steps[1] ──▶ … ──▶ steps[n-1] ──▶ END
//! ```
//!
//! Each node binds the handler resolved from the step's `agent` name to that
//! step's own declaration, so handlers see their `tools`/`icp` sub-config and
//! not the whole document. The result is always a simple path; nothing here
//! executes a handler.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use outreach_config::{StepDeclaration, WorkflowDocument};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::handler::StepHandler;
use crate::registry::HandlerRegistry;

/// Where an edge leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeTarget {
    /// Another node, by id.
    Node(String),
    /// The implicit terminal marker after the last node.
    End,
}

impl std::fmt::Display for EdgeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeTarget::Node(id) => write!(f, "{}", id),
            EdgeTarget::End => write!(f, "END"),
        }
    }
}

/// A directed edge between two nodes (or a node and `END`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: String,
    pub to: EdgeTarget,
}

/// One executable step: a handler bound to its declaration.
#[derive(Clone)]
pub struct PipelineNode {
    step: Arc<StepDeclaration>,
    handler: Arc<dyn StepHandler>,
}

impl PipelineNode {
    /// Node identity (the step id).
    pub fn id(&self) -> &str {
        &self.step.id
    }

    /// Agent name the handler was resolved from.
    pub fn agent(&self) -> &str {
        &self.step.agent
    }

    /// The step's full declaration.
    pub fn step(&self) -> &StepDeclaration {
        &self.step
    }

    pub fn handler(&self) -> &Arc<dyn StepHandler> {
        &self.handler
    }

    /// Whether the node is bound to the placeholder handler.
    pub fn is_placeholder(&self) -> bool {
        self.handler.is_placeholder()
    }
}

impl std::fmt::Debug for PipelineNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineNode")
            .field("id", &self.id())
            .field("agent", &self.agent())
            .field("placeholder", &self.is_placeholder())
            .finish()
    }
}

/// An executable linear pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    nodes: Vec<PipelineNode>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Pipeline {
    /// Workflow name the pipeline was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the entry node.
    pub fn entry(&self) -> &str {
        // Build rejects empty workflows, so there is always a first node.
        self.nodes[0].id()
    }

    /// Nodes in execution order.
    pub fn nodes(&self) -> &[PipelineNode] {
        &self.nodes
    }

    /// Edges in execution order; the last one always targets `END`.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&PipelineNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Where the single outgoing edge of `id` leads.
    pub fn successor(&self, id: &str) -> Option<&EdgeTarget> {
        self.index.get(id).map(|&i| &self.edges[i].to)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a built pipeline; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of steps whose agent had no registered handler.
    pub fn placeholder_steps(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.is_placeholder())
            .map(PipelineNode::id)
            .collect()
    }
}

/// Builds [`Pipeline`]s from workflow documents against an injected registry.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    registry: Arc<HandlerRegistry>,
}

impl PipelineBuilder {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Wire a workflow document into an executable pipeline.
    ///
    /// Checks:
    /// - At least one step
    /// - No empty step ids
    /// - No duplicate step ids
    pub fn build(&self, document: &WorkflowDocument) -> Result<Pipeline> {
        validate(document)?;

        let name = document.display_name().to_string();
        info!(workflow = %name, steps = document.steps.len(), "Building pipeline");

        let mut nodes = Vec::with_capacity(document.steps.len());
        let mut index = HashMap::with_capacity(document.steps.len());

        for (i, step) in document.steps.iter().enumerate() {
            let handler = self.registry.resolve(&step.agent);
            if handler.is_placeholder() {
                warn!(
                    step_id = %step.id,
                    agent = %step.agent,
                    "No handler registered for agent; step will be skipped"
                );
            }
            debug!(step_id = %step.id, agent = %step.agent, "Adding node");
            index.insert(step.id.clone(), i);
            nodes.push(PipelineNode {
                step: Arc::new(step.clone()),
                handler,
            });
        }

        let mut edges = Vec::with_capacity(nodes.len());
        for pair in nodes.windows(2) {
            debug!(from = %pair[0].id(), to = %pair[1].id(), "Adding edge");
            edges.push(Edge {
                from: pair[0].id().to_string(),
                to: EdgeTarget::Node(pair[1].id().to_string()),
            });
        }
        if let Some(last) = nodes.last() {
            edges.push(Edge {
                from: last.id().to_string(),
                to: EdgeTarget::End,
            });
        }

        info!(
            workflow = %name,
            entry = %nodes[0].id(),
            nodes = nodes.len(),
            "Pipeline built"
        );

        Ok(Pipeline {
            name,
            nodes,
            edges,
            index,
        })
    }
}

fn validate(document: &WorkflowDocument) -> Result<()> {
    if document.steps.is_empty() {
        return Err(PipelineError::EmptyWorkflow);
    }

    let mut seen_ids = HashSet::new();
    for step in &document.steps {
        if step.id.is_empty() {
            return Err(PipelineError::InvalidWorkflow(
                "Step ID cannot be empty".into(),
            ));
        }
        if !seen_ids.insert(step.id.as_str()) {
            return Err(PipelineError::InvalidWorkflow(format!(
                "Duplicate step ID: {}",
                step.id
            )));
        }
    }

    Ok(())
}
