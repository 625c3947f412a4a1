//! Hypervisor CLI - simulate scenarios, plan ranges and quote liquidity.

mod cli;
mod commands;
mod output;
mod scenario;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::{run_plan, run_quote, run_simulate};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => run_simulate(&args, cli.format)?,
        Commands::Plan(args) => run_plan(&args, cli.format)?,
        Commands::Quote(args) => run_quote(&args, cli.format)?,
    }

    Ok(())
}
