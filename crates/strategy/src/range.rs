//! Base and limit range planning.

use std::cmp::Ordering;

use alloy_primitives::{I256, U256};
use hypervisor_vault::math::{mul_div_down, token0_in_token1};
use hypervisor_vault::tick_math::{ceil_to_spacing, floor_to_spacing, max_usable_tick, min_usable_tick};
use hypervisor_vault::MathError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StrategyError};
use crate::types::{bps_to_decimal, ratio_bps, RebalancePlan, Side, BPS};

/// Symmetric base range around the current tick plus a one-sided limit range.
///
/// Widths are in ticks and must be positive multiples of `tick_spacing`.
///
/// # Example
///
/// ```rust,ignore
/// let strategy = RangeStrategy::new(60)
///     .with_base_width(1200)
///     .with_limit_width(600);
/// let plan = strategy.plan(tick, amount0, amount1, sqrt_price)?;
/// let swap = strategy.swap_to_balance(amount0, amount1, sqrt_price, 50)?;
/// vault.rebalance(owner, &plan.to_params(fee_recipient).with_swap(swap))?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeStrategy {
    pub tick_spacing: i32,
    /// Distance from the floored current tick to each edge of the base range
    pub base_width: i32,
    /// Width of the limit range
    pub limit_width: i32,
}

impl Default for RangeStrategy {
    fn default() -> Self {
        Self::new(60)
    }
}

impl RangeStrategy {
    /// Strategy for a pool with `tick_spacing`, with a base of 20 spacings
    /// either side and a limit of 10 spacings.
    pub fn new(tick_spacing: i32) -> Self {
        Self {
            tick_spacing,
            base_width: tick_spacing.saturating_mul(20),
            limit_width: tick_spacing.saturating_mul(10),
        }
    }

    pub fn with_base_width(mut self, base_width: i32) -> Self {
        self.base_width = base_width;
        self
    }

    pub fn with_limit_width(mut self, limit_width: i32) -> Self {
        self.limit_width = limit_width;
        self
    }

    /// Checks the spacing and both widths.
    pub fn validate(&self) -> Result<()> {
        if self.tick_spacing <= 0 {
            return Err(StrategyError::InvalidTickSpacing(self.tick_spacing));
        }
        for width in [self.base_width, self.limit_width] {
            if width <= 0 || width % self.tick_spacing != 0 {
                return Err(StrategyError::InvalidWidth {
                    width,
                    tick_spacing: self.tick_spacing,
                });
            }
        }
        Ok(())
    }

    /// Ranges for the next rebalance.
    ///
    /// The base range is centred on the current tick floored to the spacing.
    /// The limit range sits just above the price when token0 holds more value
    /// and just below it otherwise, so it can only be filled with the excess
    /// token.
    pub fn plan(
        &self,
        current_tick: i32,
        amount0: U256,
        amount1: U256,
        sqrt_price: U256,
    ) -> Result<RebalancePlan> {
        self.validate()?;
        let spacing = self.tick_spacing;
        let (min_tick, max_tick) = (min_usable_tick(spacing), max_usable_tick(spacing));
        let floor = floor_to_spacing(current_tick, spacing);
        let ceil = ceil_to_spacing(current_tick, spacing);

        let base_lower = floor.saturating_sub(self.base_width).max(min_tick);
        let base_upper = floor.saturating_add(self.base_width).min(max_tick);
        ensure_room(base_lower, base_upper)?;

        let value0 = token0_in_token1(amount0, sqrt_price)?;
        let value1 = amount1;
        let excess = match value0.cmp(&value1) {
            Ordering::Greater => Side::Token0,
            Ordering::Less => Side::Token1,
            Ordering::Equal => Side::Balanced,
        };

        let (limit_lower, limit_upper) = if excess == Side::Token0 {
            (ceil, ceil.saturating_add(self.limit_width).min(max_tick))
        } else {
            (floor.saturating_sub(self.limit_width).max(min_tick), floor)
        };
        ensure_room(limit_lower, limit_upper)?;
        if (limit_lower, limit_upper) == (base_lower, base_upper) {
            return Err(StrategyError::NoRoom {
                tick_lower: limit_lower,
                tick_upper: limit_upper,
            });
        }

        let total = value0.checked_add(value1).ok_or(MathError::Overflow)?;
        let excess_ratio = bps_to_decimal(ratio_bps(value0.max(value1), total)?);

        debug!(
            current_tick,
            base_lower, base_upper, limit_lower, limit_upper, ?excess, %excess_ratio,
            "range plan"
        );
        Ok(RebalancePlan {
            base_lower,
            base_upper,
            limit_lower,
            limit_upper,
            excess,
            excess_ratio,
            value0,
            value1,
        })
    }

    /// Swap that roughly evens out the two token values.
    ///
    /// Sells half the value gap as an exact input: positive quantities sell
    /// token0, negative ones sell token1. Price impact and fees are ignored, so
    /// the result lands close to, not exactly at, parity. Returns zero when the
    /// gap is within `tolerance_bps` of the total value.
    pub fn swap_to_balance(
        &self,
        amount0: U256,
        amount1: U256,
        sqrt_price: U256,
        tolerance_bps: u32,
    ) -> Result<I256> {
        if u64::from(tolerance_bps) > BPS {
            return Err(StrategyError::InvalidTolerance(tolerance_bps));
        }
        let value0 = token0_in_token1(amount0, sqrt_price)?;
        let value1 = amount1;
        let total = value0.checked_add(value1).ok_or(MathError::Overflow)?;
        let gap = if value0 > value1 {
            value0 - value1
        } else {
            value1 - value0
        };
        if total.is_zero() || ratio_bps(gap, total)? <= u64::from(tolerance_bps) {
            return Ok(I256::ZERO);
        }

        let half = gap >> 1;
        if value0 > value1 {
            // Value is linear in amount0, so scale holdings rather than invert the price.
            let sell0 = mul_div_down(amount0, half, value0)?;
            to_signed(sell0)
        } else {
            Ok(-to_signed(half)?)
        }
    }
}

fn ensure_room(tick_lower: i32, tick_upper: i32) -> Result<()> {
    if tick_lower < tick_upper {
        Ok(())
    } else {
        Err(StrategyError::NoRoom {
            tick_lower,
            tick_upper,
        })
    }
}

fn to_signed(amount: U256) -> Result<I256> {
    I256::try_from(amount).map_err(|_| StrategyError::Math(MathError::Overflow))
}
