//! CLI command handlers.

pub mod agents;
pub mod graph;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use outreach_config::{LoadedWorkflow, OutreachConfig, SecretMap, load_workflow};
use outreach_pipeline::{Pipeline, PipelineBuilder};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged settings from the user and project layers.
    pub config: OutreachConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// The workflow to use: the `--workflow` argument, else the configured one.
    pub fn workflow_path(&self, arg: Option<PathBuf>) -> PathBuf {
        arg.unwrap_or_else(|| self.config.workflow_path())
    }

    /// Secrets from the environment (and `.env`, if enabled).
    pub fn secrets(&self) -> SecretMap {
        SecretMap::from_env(&self.config.secret_names(), self.config.load_dotenv())
    }
}

/// Load a workflow and wire it against the bundled agents.
pub fn prepare(ctx: &Context, path: &Path) -> Result<(LoadedWorkflow, Pipeline)> {
    let loaded = load_workflow(path, &ctx.secrets())
        .with_context(|| format!("Failed to load workflow from {}", path.display()))?;
    let registry = Arc::new(outreach_agents::builtin_registry());
    let pipeline = PipelineBuilder::new(registry)
        .build(&loaded.document)
        .with_context(|| format!("Failed to build pipeline from {}", path.display()))?;
    Ok((loaded, pipeline))
}
