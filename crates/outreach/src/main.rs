//! Outreach - declarative sales-outreach pipeline runner
//!
//! Main entry point for the outreach CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

mod commands;

use commands::{agents, graph, run, validate};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Outreach - declarative sales-outreach pipeline runner
#[derive(Parser)]
#[command(name = "outreach")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the workflow and print the final state
    Run(run::RunArgs),

    /// Load and wire the workflow without running it
    Validate(validate::ValidateArgs),

    /// Show the pipeline's nodes and edges
    Graph(graph::GraphArgs),

    /// List the bundled agents
    Agents(agents::AgentsArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_dir = std::env::current_dir()?;
    let loaded = outreach_config::load_config(Some(&project_dir))?;
    let config = loaded.config.clone();

    // Initialize tracing: console (human-readable, stderr) + rotating JSON file
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level()
    };
    let filter = format!(
        "outreach={level},outreach_pipeline={level},outreach_agents={level},outreach_config={level},warn"
    );

    use tracing_subscriber::prelude::*;
    let (file_layer, _guard) = if config.log_to_file() {
        let log_dir = outreach_config::xdg_config_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| std::path::PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "outreach.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(tracing_subscriber::EnvFilter::new(
                "outreach=trace,outreach_pipeline=trace,outreach_agents=trace,outreach_config=trace,info",
            ));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer)
        .init();

    for path in loaded.loaded_from() {
        debug!(path = %path.display(), "Loaded settings");
    }
    for warning in &loaded.warnings {
        warn!("{}", warning);
    }

    // Create context for commands
    let ctx = commands::Context {
        config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::Validate(args) => validate::run(args, &ctx).await,
        Commands::Graph(args) => graph::run(args, &ctx).await,
        Commands::Agents(args) => agents::run(args, &ctx).await,
    }
}
