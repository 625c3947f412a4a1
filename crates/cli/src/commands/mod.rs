//! Command implementations.

pub mod plan;
pub mod quote;
pub mod simulate;

pub use plan::run_plan;
pub use quote::run_quote;
pub use simulate::run_simulate;
