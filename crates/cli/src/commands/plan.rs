//! Range planning.

use anyhow::{Context, Result};
use hypervisor_strategy::RangeStrategy;
use hypervisor_vault::tick_math::sqrt_ratio_at_tick;
use serde::Serialize;

use crate::cli::{OutputFormat, PlanArgs};
use crate::output::format_plan_table;

/// A plan plus the swap that balances the holdings.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    #[serde(flatten)]
    pub plan: hypervisor_strategy::RebalancePlan,
    /// Signed swap quantity; positive sells token0
    pub swap_quantity: String,
}

pub fn run_plan(args: &PlanArgs, format: OutputFormat) -> Result<()> {
    let strategy = RangeStrategy::new(args.spacing)
        .with_base_width(args.base_width)
        .with_limit_width(args.limit_width);
    let sqrt_price = sqrt_ratio_at_tick(args.tick).context("Invalid tick")?;

    let plan = strategy.plan(args.tick, args.amount0, args.amount1, sqrt_price)?;
    let swap = strategy.swap_to_balance(args.amount0, args.amount1, sqrt_price, args.tolerance_bps)?;
    let output = PlanOutput {
        plan,
        swap_quantity: swap.to_string(),
    };

    match format {
        OutputFormat::Table => {
            println!("{}", format_plan_table(&output));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output)?;
            println!("{}", json);
        }
    }

    Ok(())
}
