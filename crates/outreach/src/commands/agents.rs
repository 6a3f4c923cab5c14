//! Agents command - lists the bundled step handlers.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::Context;

/// Arguments for the agents command.
#[derive(Args, Debug)]
pub struct AgentsArgs {}

/// Run the agents command.
pub async fn run(_args: AgentsArgs, ctx: &Context) -> Result<()> {
    let registry = outreach_agents::builtin_registry();
    let names = registry.names();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!();
    println!("{}", style("Bundled agents").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    for name in names {
        println!("  {}", name);
    }
    println!();
    println!(
        "  {}",
        dim.apply_to("Steps naming any other agent run as no-op placeholders.")
    );
    println!();

    Ok(())
}
