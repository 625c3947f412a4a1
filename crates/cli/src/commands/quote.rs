//! Liquidity quotes for a single range.

use alloy_primitives::U256;
use anyhow::{ensure, Result};
use hypervisor_vault::liquidity_math::{amounts_for_liquidity, liquidity_for_amounts};
use hypervisor_vault::tick_math::sqrt_ratio_at_tick;
use serde::Serialize;

use crate::cli::{OutputFormat, QuoteArgs};
use crate::output::format_quote_table;

/// Liquidity a range supports and what minting it costs.
#[derive(Debug, Serialize)]
pub struct Quote {
    pub tick: i32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Amounts a mint of `liquidity` pays, rounded up
    pub amount0: U256,
    pub amount1: U256,
    pub leftover0: U256,
    pub leftover1: U256,
}

pub fn quote(args: &QuoteArgs) -> Result<Quote> {
    ensure!(
        args.lower < args.upper,
        "Lower tick {} must be below upper tick {}",
        args.lower,
        args.upper
    );
    let sqrt_price = sqrt_ratio_at_tick(args.tick)?;
    let sqrt_lower = sqrt_ratio_at_tick(args.lower)?;
    let sqrt_upper = sqrt_ratio_at_tick(args.upper)?;

    let liquidity =
        liquidity_for_amounts(sqrt_price, sqrt_lower, sqrt_upper, args.amount0, args.amount1)?;
    let (amount0, amount1) =
        amounts_for_liquidity(sqrt_price, sqrt_lower, sqrt_upper, liquidity, true)?;

    Ok(Quote {
        tick: args.tick,
        tick_lower: args.lower,
        tick_upper: args.upper,
        liquidity,
        amount0,
        amount1,
        leftover0: args.amount0.saturating_sub(amount0),
        leftover1: args.amount1.saturating_sub(amount1),
    })
}

pub fn run_quote(args: &QuoteArgs, format: OutputFormat) -> Result<()> {
    let quote = quote(args)?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_quote_table(&quote));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&quote)?;
            println!("{}", json);
        }
    }

    Ok(())
}
