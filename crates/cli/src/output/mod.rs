//! Output formatting for CLI results.

pub mod detail;
pub mod table;

pub use detail::format_state_detail;
pub use table::{format_plan_table, format_quote_table, format_steps_table};
