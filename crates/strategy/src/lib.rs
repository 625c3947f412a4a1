//! Range planning for hypervisor vault advisors.
//!
//! Given the pool's current tick and the vault's holdings, [`RangeStrategy`]
//! proposes the base and limit ranges for the next rebalance and the swap
//! that would even out the two token values. Everything here is pure; the
//! output converts into [`hypervisor_vault::RebalanceParams`].

mod error;
mod range;
mod types;

pub use error::{Result, StrategyError};
pub use range::RangeStrategy;
pub use types::*;
