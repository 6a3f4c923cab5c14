//! Validate command - loads and wires a workflow without running any step.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use super::{Context, prepare};

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Workflow document (JSON or TOML); defaults to the configured workflow
    #[arg(short, long)]
    pub workflow: Option<PathBuf>,

    /// Fail if any secret is unresolved or any agent is not implemented
    #[arg(long)]
    pub strict: bool,
}

/// Validation report for JSON output.
#[derive(Debug, Serialize)]
struct ValidateOutput<'a> {
    valid: bool,
    workflow: &'a str,
    path: String,
    steps: usize,
    substitutions: usize,
    unresolved_placeholders: &'a [String],
    placeholder_steps: Vec<&'a str>,
}

/// Run the validate command.
pub async fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    let path = ctx.workflow_path(args.workflow);
    let (loaded, pipeline) = prepare(ctx, &path)?;

    let placeholder_steps = pipeline.placeholder_steps();
    let clean = loaded.unresolved.is_empty() && placeholder_steps.is_empty();

    if ctx.json_output {
        let output = ValidateOutput {
            valid: clean || !args.strict,
            workflow: pipeline.name(),
            path: path.display().to_string(),
            steps: pipeline.len(),
            substitutions: loaded.substitutions,
            unresolved_placeholders: &loaded.unresolved,
            placeholder_steps: placeholder_steps.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let green = Style::new().green();
        let yellow = Style::new().yellow();
        let dim = Style::new().dim();

        println!();
        println!("{} {}", style("Workflow").bold(), pipeline.name());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("  {} {}", dim.apply_to("File:"), path.display());
        println!("  {} {}", dim.apply_to("Steps:"), pipeline.len());
        if ctx.verbose {
            println!(
                "  {} {}",
                dim.apply_to("Secrets substituted:"),
                loaded.substitutions
            );
        }

        for name in &loaded.unresolved {
            println!(
                "  {} unresolved secret {}",
                yellow.apply_to("!"),
                outreach_config::placeholder_token(name)
            );
        }
        for step_id in &placeholder_steps {
            let agent = pipeline.node(step_id).map(|n| n.agent()).unwrap_or("?");
            println!(
                "  {} step '{}' uses unimplemented agent {}",
                yellow.apply_to("!"),
                step_id,
                agent
            );
        }

        if clean {
            println!("  {}", green.apply_to("✓ valid"));
        }
        println!();
    }

    if args.strict && !clean {
        bail!(
            "Workflow has {} unresolved secret(s) and {} unimplemented step(s)",
            loaded.unresolved.len(),
            placeholder_steps.len()
        );
    }
    Ok(())
}
