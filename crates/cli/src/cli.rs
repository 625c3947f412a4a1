//! CLI argument definitions using clap.

use std::path::PathBuf;

use alloy_primitives::U256;
use clap::{Parser, Subcommand, ValueEnum};

/// Hypervisor CLI - simulate and plan two-range liquidity vaults
#[derive(Parser, Debug)]
#[command(name = "hypervisor")]
#[command(about = "CLI tool for simulating and planning hypervisor vaults", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a JSON scenario against a simulated pool, vault and admin
    Simulate(SimulateArgs),
    /// Propose base and limit ranges for a rebalance
    Plan(PlanArgs),
    /// Liquidity a range supports for the given amounts
    Quote(QuoteArgs),
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to the scenario file
    pub scenario: PathBuf,

    /// Exit with an error if any step fails
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Current pool tick
    #[arg(long, allow_hyphen_values = true)]
    pub tick: i32,

    /// Pool tick spacing
    #[arg(long, default_value = "60")]
    pub spacing: i32,

    /// Ticks from the current tick to each edge of the base range
    #[arg(long, default_value = "1200")]
    pub base_width: i32,

    /// Width of the limit range in ticks
    #[arg(long, default_value = "600")]
    pub limit_width: i32,

    /// Token0 held by the vault, in raw units
    #[arg(long)]
    pub amount0: U256,

    /// Token1 held by the vault, in raw units
    #[arg(long)]
    pub amount1: U256,

    /// Skip the swap when the value gap is within this many basis points
    #[arg(long, default_value = "0")]
    pub tolerance_bps: u32,
}

#[derive(Parser, Debug)]
pub struct QuoteArgs {
    /// Current pool tick
    #[arg(long, allow_hyphen_values = true)]
    pub tick: i32,

    /// Lower tick of the range
    #[arg(long, allow_hyphen_values = true)]
    pub lower: i32,

    /// Upper tick of the range
    #[arg(long, allow_hyphen_values = true)]
    pub upper: i32,

    /// Token0 available, in raw units
    #[arg(long)]
    pub amount0: U256,

    /// Token1 available, in raw units
    #[arg(long)]
    pub amount1: U256,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
