//! Table formatting for steps, plans and quotes.

use colored::Colorize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::commands::plan::PlanOutput;
use crate::commands::quote::Quote;
use crate::scenario::{StepReport, StepStatus};

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn truncate_detail(detail: &str, max_len: usize) -> String {
    if detail.chars().count() > max_len {
        let head: String = detail.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        detail.to_string()
    }
}

fn field(field: &str, value: impl ToString) -> FieldRow {
    FieldRow {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));
    table.to_string()
}

pub fn format_steps_table(steps: &[StepReport]) -> String {
    if steps.is_empty() {
        return "No steps.".to_string();
    }

    let rows: Vec<StepRow> = steps
        .iter()
        .map(|step| {
            let status = match (step.status, step.kind) {
                (StepStatus::Ok, _) => "ok".green().to_string(),
                (StepStatus::Error, Some(kind)) => kind.red().to_string(),
                (StepStatus::Error, None) => "error".red().to_string(),
            };
            StepRow {
                index: step.index,
                action: step.action.to_string(),
                status,
                detail: truncate_detail(&step.detail, 80),
            }
        })
        .collect();

    render(rows)
}

pub fn format_plan_table(output: &PlanOutput) -> String {
    let plan = &output.plan;
    render(vec![
        field("Base range", format!("[{}, {}]", plan.base_lower, plan.base_upper)),
        field("Limit range", format!("[{}, {}]", plan.limit_lower, plan.limit_upper)),
        field("Excess", format!("{:?}", plan.excess)),
        field("Excess ratio", plan.excess_ratio),
        field("Value0 (in token1)", plan.value0),
        field("Value1", plan.value1),
        field("Swap", &output.swap_quantity),
    ])
}

pub fn format_quote_table(quote: &Quote) -> String {
    render(vec![
        field("Tick", quote.tick),
        field("Range", format!("[{}, {}]", quote.tick_lower, quote.tick_upper)),
        field("Liquidity", quote.liquidity),
        field("Amount0", quote.amount0),
        field("Amount1", quote.amount1),
        field("Leftover0", quote.leftover0),
        field("Leftover1", quote.leftover1),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_detail() {
        assert_eq!(truncate_detail("short", 10), "short");
        assert_eq!(truncate_detail("abcdefghijkl", 10), "abcdefg...");
    }

    #[test]
    fn test_empty_steps() {
        assert_eq!(format_steps_table(&[]), "No steps.");
    }
}
