//! Scenario replay.

use anyhow::{bail, Context, Result};

use crate::cli::{OutputFormat, SimulateArgs};
use crate::output::{format_state_detail, format_steps_table};
use crate::scenario::{self, Scenario};

pub fn run_simulate(args: &SimulateArgs, format: OutputFormat) -> Result<()> {
    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid scenario {}", args.scenario.display()))?;

    let report = scenario::run(&scenario)?;

    match format {
        OutputFormat::Table => {
            if let Some(name) = &report.name {
                println!("{}\n", name);
            }
            println!("{}", format_steps_table(&report.steps));
            println!();
            println!("{}", format_state_detail(&report));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
    }

    if args.strict {
        if let Some(failed) = report.failures().next() {
            bail!(
                "Step {} ({}) failed: {}",
                failed.index,
                failed.action,
                failed.detail
            );
        }
    }

    Ok(())
}
