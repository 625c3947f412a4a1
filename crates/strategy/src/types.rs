//! Plan types and ratio helpers.

use alloy_primitives::{Address, U256};
use hypervisor_vault::math::mul_div_down;
use hypervisor_vault::{MathError, RebalanceParams};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Basis points in one whole.
pub const BPS: u64 = 10_000;

/// Which token holds more value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Token0,
    Token1,
    #[default]
    Balanced,
}

/// Ranges proposed for one rebalance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancePlan {
    pub base_lower: i32,
    pub base_upper: i32,
    pub limit_lower: i32,
    pub limit_upper: i32,
    /// Token with more value; the limit range is single-sided in it.
    pub excess: Side,
    /// Value share of the excess token (0.5 to 1.0; zero for empty holdings).
    pub excess_ratio: Decimal,
    /// Holdings valued in token1.
    pub value0: U256,
    pub value1: U256,
}

impl RebalancePlan {
    /// Rebalance parameters for this plan without a swap.
    pub fn to_params(&self, fee_recipient: Address) -> RebalanceParams {
        RebalanceParams::new(
            self.base_lower,
            self.base_upper,
            self.limit_lower,
            self.limit_upper,
            fee_recipient,
        )
    }
}

/// Ratio `part / total` in basis points, rounded down. Zero when `total` is zero.
pub fn ratio_bps(part: U256, total: U256) -> Result<u64, MathError> {
    if total.is_zero() {
        return Ok(0);
    }
    let bps = mul_div_down(part, U256::from(BPS), total)?;
    Ok(bps.saturating_to::<u64>())
}

/// Convert basis points to a decimal fraction (`2500` becomes `0.25`).
pub fn bps_to_decimal(bps: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(bps), 4).normalize()
}

/// Convert a decimal fraction to basis points, saturating at the `u64` bounds.
pub fn decimal_to_bps(d: Decimal) -> u64 {
    let bps = (d * Decimal::from(BPS)).round();
    if bps.is_sign_negative() {
        return 0;
    }
    bps.try_into().unwrap_or(u64::MAX)
}
