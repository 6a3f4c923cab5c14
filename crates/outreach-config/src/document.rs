//! Declarative workflow document model and loader.
//!
//! A workflow document is an ordered list of step declarations. Each step
//! names the agent that handles it; everything else in the step is opaque
//! configuration that is passed through verbatim to that agent.
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "outbound_q3",
//!   "steps": [
//!     { "id": "prospect_search", "agent": "ProspectSearchAgent",
//!       "icp": { "industry": "SaaS", "employee_count": { "min": 100, "max": 1000 } } },
//!     { "id": "send", "agent": "OutreachExecutorAgent",
//!       "tools": [{ "name": "SendGrid", "config": { "api_key": "{{SENDGRID_API_KEY}}" } }] }
//!   ]
//! }
//! ```
//!
//! The same shape is accepted as TOML when the file has a `.toml` extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::secrets::{self, SecretMap};
use crate::{ConfigError, Result};

/// A complete declarative workflow.
///
/// Immutable once loaded; the pipeline builder only borrows it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowDocument {
    /// Optional workflow name, used in logs and run reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<StepDeclaration>,

    /// Any other document-level metadata.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StepDeclaration {
    /// Unique step identifier within the document.
    pub id: String,

    /// Name of the agent that handles this step.
    pub agent: String,

    /// Step-specific configuration (`tools`, `icp`, ...), not interpreted by the engine.
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl WorkflowDocument {
    /// Create a document from an ordered list of steps.
    pub fn new(steps: Vec<StepDeclaration>) -> Self {
        Self {
            name: None,
            description: None,
            steps,
            extra: Map::new(),
        }
    }

    /// Set the workflow name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The workflow name, or `"workflow"` when the document has none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("workflow")
    }

    /// Convert an already-parsed document tree into a `WorkflowDocument`.
    pub fn from_value(value: Value) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl StepDeclaration {
    pub fn new(id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent: agent.into(),
            config: Map::new(),
        }
    }

    /// Builder-style setter for a configuration field.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Raw access to a configuration field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Integer configuration field.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.config.get(key).and_then(Value::as_u64)
    }

    /// String configuration field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    /// The `config` object of the tool at `index` in the step's `tools` list.
    pub fn tool_config(&self, index: usize) -> Option<&Map<String, Value>> {
        self.config
            .get("tools")?
            .as_array()?
            .get(index)?
            .get("config")?
            .as_object()
    }

    /// A string setting inside `tools[index].config`.
    pub fn tool_setting(&self, index: usize, key: &str) -> Option<&str> {
        self.tool_config(index)?.get(key)?.as_str()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Structured-text format of a workflow document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from a file extension. Anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

/// A resolved workflow document together with resolution diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedWorkflow {
    /// The parsed document, with secrets substituted.
    pub document: WorkflowDocument,
    /// Where the document was read from, if it came from a file.
    pub path: Option<PathBuf>,
    /// Number of placeholder leaves replaced with secret values.
    pub substitutions: usize,
    /// Placeholder names that had no non-empty secret and were left in place.
    pub unresolved: Vec<String>,
}

/// Parse raw document text, substitute secrets, and build a `WorkflowDocument`.
///
/// `origin` names the source in error messages (a path, or e.g. `"<inline>"`).
pub fn resolve_document(
    raw: &str,
    format: DocumentFormat,
    secrets: &SecretMap,
    origin: &str,
) -> Result<LoadedWorkflow> {
    let mut tree: Value = match format {
        DocumentFormat::Json => {
            serde_json::from_str(raw).map_err(|e| ConfigError::parse(origin, e))?
        }
        DocumentFormat::Toml => {
            let table: toml::Value =
                toml::from_str(raw).map_err(|e| ConfigError::parse(origin, e))?;
            serde_json::to_value(table).map_err(|e| ConfigError::parse(origin, e))?
        }
    };

    let substitutions = secrets.substitute(&mut tree);
    let unresolved = secrets::unresolved_placeholders(&tree);

    let document = WorkflowDocument::from_value(tree).map_err(|e| ConfigError::parse(origin, e))?;

    debug!(
        origin,
        steps = document.steps.len(),
        substitutions,
        "Workflow document resolved"
    );
    for name in &unresolved {
        warn!(origin, placeholder = %name, "Secret placeholder left unresolved");
    }

    Ok(LoadedWorkflow {
        document,
        path: None,
        substitutions,
        unresolved,
    })
}

/// Read a workflow document from disk and resolve it.
///
/// Fails with [`ConfigError::ConfigNotFound`] when the file does not exist and
/// [`ConfigError::ConfigParse`] when its contents are malformed.
pub fn load_workflow(path: &Path, secrets: &SecretMap) -> Result<LoadedWorkflow> {
    let origin = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::ConfigNotFound {
            path: origin.clone(),
        },
        _ => ConfigError::ReadFile {
            path: origin.clone(),
            source: e,
        },
    })?;

    let mut loaded = resolve_document(&raw, DocumentFormat::from_path(path), secrets, &origin)?;
    loaded.path = Some(path.to_path_buf());
    Ok(loaded)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
