//! Detailed output for a finished scenario.

use colored::Colorize;
use hypervisor_vault::PositionSummary;

use crate::scenario::ScenarioReport;

fn format_range(position: &PositionSummary) -> String {
    if position.tick_lower == position.tick_upper {
        return "-".to_string();
    }
    format!(
        "[{}, {}] liquidity {} ({} / {})",
        position.tick_lower,
        position.tick_upper,
        position.liquidity,
        position.amount0,
        position.amount1
    )
}

pub fn format_state_detail(report: &ScenarioReport) -> String {
    let state = &report.final_state;
    let mut output = String::new();

    output.push_str(&format!("{}\n", "=".repeat(60)));
    output.push_str(&format!("{}\n", "Final state".bold()));
    output.push_str(&format!("{}\n\n", "=".repeat(60)));

    output.push_str(&format!("{}\n", "Vault".cyan().bold()));
    output.push_str(&format!("  Address:      {}\n", state.address));
    output.push_str(&format!("  Owner:        {}\n", state.owner));
    output.push_str(&format!("  Tick:         {}\n", state.tick));
    output.push_str(&format!("  Total supply: {}\n", state.total_supply));
    output.push_str(&format!("  Clock:        {}\n\n", report.clock));

    output.push_str(&format!("{}\n", "Holdings".cyan().bold()));
    output.push_str(&format!("  Total token0: {}\n", state.total_amount0));
    output.push_str(&format!("  Total token1: {}\n", state.total_amount1));
    output.push_str(&format!(
        "  Idle:         {} / {}\n",
        state.idle.amount0, state.idle.amount1
    ));
    output.push_str(&format!("  Base:         {}\n", format_range(&state.base)));
    output.push_str(&format!("  Limit:        {}\n\n", format_range(&state.limit)));

    output.push_str(&format!("{}\n", "Limits".cyan().bold()));
    output.push_str(&format!(
        "  Deposit max:  {} / {}\n",
        state.deposit_max0, state.deposit_max1
    ));
    output.push_str(&format!("  Max supply:   {}\n", state.max_total_supply));

    let holdings = report.admin_holdings;
    if !(holdings.token0.is_zero() && holdings.token1.is_zero()) {
        output.push_str(&format!(
            "\n{}\n  Admin holds:  {} / {}\n",
            "Extracted".yellow().bold(),
            holdings.token0,
            holdings.token1
        ));
    }

    output
}
