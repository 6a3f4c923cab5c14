//! Graph command - prints the wired pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use super::{Context, prepare};

/// Arguments for the graph command.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Workflow document (JSON or TOML); defaults to the configured workflow
    #[arg(short, long)]
    pub workflow: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct NodeOutput<'a> {
    id: &'a str,
    agent: &'a str,
    placeholder: bool,
}

#[derive(Debug, Serialize)]
struct EdgeOutput<'a> {
    from: &'a str,
    to: String,
}

#[derive(Debug, Serialize)]
struct GraphOutput<'a> {
    workflow: &'a str,
    entry: &'a str,
    nodes: Vec<NodeOutput<'a>>,
    edges: Vec<EdgeOutput<'a>>,
}

/// Run the graph command.
pub async fn run(args: GraphArgs, ctx: &Context) -> Result<()> {
    let path = ctx.workflow_path(args.workflow);
    let (_loaded, pipeline) = prepare(ctx, &path)?;

    if ctx.json_output {
        let output = GraphOutput {
            workflow: pipeline.name(),
            entry: pipeline.entry(),
            nodes: pipeline
                .nodes()
                .iter()
                .map(|n| NodeOutput {
                    id: n.id(),
                    agent: n.agent(),
                    placeholder: n.is_placeholder(),
                })
                .collect(),
            edges: pipeline
                .edges()
                .iter()
                .map(|e| EdgeOutput {
                    from: &e.from,
                    to: e.to.to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let yellow = Style::new().yellow();
    let dim = Style::new().dim();

    println!();
    println!("{} {}", style("Pipeline").bold(), pipeline.name());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!("  {} {}", dim.apply_to("entry"), pipeline.entry());
    for node in pipeline.nodes() {
        let next = pipeline
            .successor(node.id())
            .map(|t| t.to_string())
            .unwrap_or_default();
        let agent = if node.is_placeholder() {
            yellow.apply_to(format!("{} (not implemented)", node.agent()))
        } else {
            dim.apply_to(node.agent().to_string())
        };
        println!("  {} {} → {}", node.id(), agent, next);
    }
    println!();

    Ok(())
}
