//! In-memory concentrated-liquidity pool.
//!
//! [`SimPool`] implements [`PoolAdapter`] with exact integer math: an
//! initialized-tick map of net liquidity, exact-input swaps that step from
//! tick to tick, and fees credited pro-rata to the positions active during
//! each step. Background liquidity can be added over the full range so
//! there is always a counterparty to swap with.
//!
//! Two hooks exist for exercising callers: [`SimPool::reject`] makes a given
//! entry point fail, and [`SimPool::set_observer`] runs a callback at the
//! start of every mutating call, the way a real pool calls back into its
//! liquidity provider.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::liquidity_math::{
    amount0_delta, amount1_delta, amounts_for_liquidity, next_sqrt_price_from_input,
};
use crate::math::{mul_div_down, mul_div_up, MathError};
use crate::pool::{PoolAdapter, PoolCall, PoolError};
use crate::tick_math::{
    is_aligned, max_usable_tick, min_usable_tick, sqrt_ratio_at_tick, tick_at_sqrt_ratio,
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK,
};

/// Fee denominator: fees are expressed in hundredths of a basis point.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Callback invoked at the start of each mutating pool call.
pub type PoolObserver = Arc<dyn Fn(PoolCall) -> Result<(), PoolError> + Send + Sync>;

/// Liquidity and uncollected tokens held on one range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPosition {
    /// Liquidity currently deployed
    pub liquidity: u128,
    /// Token0 owed (burned principal plus fees)
    pub owed0: U256,
    /// Token1 owed (burned principal plus fees)
    pub owed1: U256,
}

struct SwapStep {
    sqrt_price_next: U256,
    amount_in: U256,
    amount_out: U256,
    fee: U256,
}

/// A single-owner concentrated-liquidity pool held in memory.
#[derive(Clone)]
pub struct SimPool {
    sqrt_price_x96: U256,
    tick: i32,
    tick_spacing: i32,
    fee_pips: u32,
    liquidity: u128,
    ticks: BTreeMap<i32, i128>,
    positions: BTreeMap<(i32, i32), PoolPosition>,
    rejected: Option<PoolCall>,
    observer: Option<PoolObserver>,
}

impl fmt::Debug for SimPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimPool")
            .field("sqrt_price_x96", &self.sqrt_price_x96)
            .field("tick", &self.tick)
            .field("tick_spacing", &self.tick_spacing)
            .field("fee_pips", &self.fee_pips)
            .field("liquidity", &self.liquidity)
            .field("positions", &self.positions)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

impl SimPool {
    /// Create an empty pool priced at `tick`.
    pub fn new(tick: i32, tick_spacing: i32, fee_pips: u32) -> Result<Self, PoolError> {
        if tick_spacing <= 0 || fee_pips >= FEE_DENOMINATOR {
            return Err(PoolError::InvalidRange {
                tick_lower: tick,
                tick_upper: tick,
            });
        }
        Ok(Self {
            sqrt_price_x96: sqrt_ratio_at_tick(tick)?,
            tick,
            tick_spacing,
            fee_pips,
            liquidity: 0,
            ticks: BTreeMap::new(),
            positions: BTreeMap::new(),
            rejected: None,
            observer: None,
        })
    }

    /// Add liquidity over the full usable range, owned by nobody the vault can see.
    pub fn with_background_liquidity(mut self, liquidity: u128) -> Result<Self, PoolError> {
        let lower = min_usable_tick(self.tick_spacing);
        let upper = max_usable_tick(self.tick_spacing);
        self.apply_liquidity_delta(lower, upper, i128_from(liquidity)?)?;
        Ok(self)
    }

    /// Make every call to `call` fail with [`PoolError::Rejected`] until cleared.
    pub fn reject(&mut self, call: Option<PoolCall>) {
        self.rejected = call;
    }

    /// Install a callback run at the start of mint, burn, collect and swap.
    pub fn set_observer(&mut self, observer: Option<PoolObserver>) {
        self.observer = observer;
    }

    /// Move the price to `tick` without trading, as if arbitrage had happened elsewhere.
    pub fn set_tick(&mut self, tick: i32) -> Result<(), PoolError> {
        self.sqrt_price_x96 = sqrt_ratio_at_tick(tick)?;
        self.tick = tick;
        let active: i128 = self.ticks.range(..=tick).map(|(_, net)| *net).sum();
        self.liquidity = u128::try_from(active).map_err(|_| MathError::Overflow)?;
        Ok(())
    }

    /// Current Q64.96 square-root price.
    pub fn sqrt_price(&self) -> U256 {
        self.sqrt_price_x96
    }

    /// Current tick.
    pub fn tick(&self) -> i32 {
        self.tick
    }

    /// Liquidity active at the current price.
    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    /// Swap fee in hundredths of a basis point.
    pub fn fee_pips(&self) -> u32 {
        self.fee_pips
    }

    /// The position on a range, if any.
    pub fn position(&self, tick_lower: i32, tick_upper: i32) -> Option<&PoolPosition> {
        self.positions.get(&(tick_lower, tick_upper))
    }

    fn enter(&self, call: PoolCall) -> Result<(), PoolError> {
        if let Some(observer) = &self.observer {
            observer(call)?;
        }
        if self.rejected == Some(call) {
            tracing::debug!(%call, "pool call rejected");
            return Err(PoolError::Rejected(call));
        }
        Ok(())
    }

    fn validate_range(&self, tick_lower: i32, tick_upper: i32) -> Result<(), PoolError> {
        let valid = tick_lower < tick_upper
            && tick_lower >= MIN_TICK
            && tick_upper <= MAX_TICK
            && is_aligned(tick_lower, self.tick_spacing)
            && is_aligned(tick_upper, self.tick_spacing);
        if valid {
            Ok(())
        } else {
            Err(PoolError::InvalidRange {
                tick_lower,
                tick_upper,
            })
        }
    }

    fn apply_liquidity_delta(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        delta: i128,
    ) -> Result<(), PoolError> {
        for (tick, signed) in [(tick_lower, delta), (tick_upper, -delta)] {
            let net = self.ticks.entry(tick).or_insert(0);
            *net = net.checked_add(signed).ok_or(MathError::Overflow)?;
            if *net == 0 {
                self.ticks.remove(&tick);
            }
        }
        if tick_lower <= self.tick && self.tick < tick_upper {
            self.liquidity = add_delta(self.liquidity, delta)?;
        }
        Ok(())
    }

    fn next_initialized_tick(&self, zero_for_one: bool) -> Option<i32> {
        if zero_for_one {
            self.ticks.range(..=self.tick).next_back().map(|(tick, _)| *tick)
        } else {
            self.ticks
                .range(self.tick.saturating_add(1)..)
                .next()
                .map(|(tick, _)| *tick)
        }
    }

    fn compute_step(
        &self,
        target: U256,
        remaining: U256,
        zero_for_one: bool,
    ) -> Result<SwapStep, PoolError> {
        let current = self.sqrt_price_x96;
        let liquidity = self.liquidity;
        if liquidity == 0 {
            return Ok(SwapStep {
                sqrt_price_next: target,
                amount_in: U256::ZERO,
                amount_out: U256::ZERO,
                fee: U256::ZERO,
            });
        }

        let denominator = U256::from(FEE_DENOMINATOR);
        let fee_complement = U256::from(FEE_DENOMINATOR - self.fee_pips);
        let remaining_less_fee = mul_div_down(remaining, fee_complement, denominator)?;

        let amount_in_to_target = if zero_for_one {
            amount0_delta(target, current, liquidity, true)?
        } else {
            amount1_delta(current, target, liquidity, true)?
        };

        let reaches_target = remaining_less_fee >= amount_in_to_target;
        let sqrt_price_next = if reaches_target {
            target
        } else {
            next_sqrt_price_from_input(current, liquidity, remaining_less_fee, zero_for_one)?
        };

        let (amount_in, amount_out) = if zero_for_one {
            (
                amount0_delta(sqrt_price_next, current, liquidity, true)?,
                amount1_delta(sqrt_price_next, current, liquidity, false)?,
            )
        } else {
            (
                amount1_delta(current, sqrt_price_next, liquidity, true)?,
                amount0_delta(current, sqrt_price_next, liquidity, false)?,
            )
        };

        let fee = if reaches_target {
            mul_div_up(amount_in, U256::from(self.fee_pips), fee_complement)?
        } else {
            remaining.checked_sub(amount_in).ok_or(MathError::Overflow)?
        };

        Ok(SwapStep {
            sqrt_price_next,
            amount_in,
            amount_out,
            fee,
        })
    }

    fn accrue_fees(&mut self, fee: U256, zero_for_one: bool) -> Result<(), PoolError> {
        if fee.is_zero() || self.liquidity == 0 {
            return Ok(());
        }
        let active = U256::from(self.liquidity);
        let tick = self.tick;
        for ((lower, upper), position) in &mut self.positions {
            if position.liquidity == 0 || !(*lower <= tick && tick < *upper) {
                continue;
            }
            let share = mul_div_down(fee, U256::from(position.liquidity), active)?;
            if zero_for_one {
                position.owed0 += share;
            } else {
                position.owed1 += share;
            }
        }
        Ok(())
    }
}

fn i128_from(liquidity: u128) -> Result<i128, PoolError> {
    i128::try_from(liquidity).map_err(|_| PoolError::Math(MathError::Overflow))
}

fn add_delta(liquidity: u128, delta: i128) -> Result<u128, PoolError> {
    let updated = if delta >= 0 {
        liquidity.checked_add(delta.unsigned_abs())
    } else {
        liquidity.checked_sub(delta.unsigned_abs())
    };
    updated.ok_or(PoolError::Math(MathError::Overflow))
}

impl PoolAdapter for SimPool {
    fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    fn current_price(&self) -> Result<U256, PoolError> {
        Ok(self.sqrt_price_x96)
    }

    fn current_tick(&self) -> Result<i32, PoolError> {
        Ok(self.tick)
    }

    fn mint(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        self.enter(PoolCall::Mint)?;
        self.validate_range(tick_lower, tick_upper)?;
        if liquidity == 0 {
            return Err(PoolError::ZeroLiquidity);
        }

        let amounts = amounts_for_liquidity(
            self.sqrt_price_x96,
            sqrt_ratio_at_tick(tick_lower)?,
            sqrt_ratio_at_tick(tick_upper)?,
            liquidity,
            true,
        )?;
        self.apply_liquidity_delta(tick_lower, tick_upper, i128_from(liquidity)?)?;
        let position = self.positions.entry((tick_lower, tick_upper)).or_default();
        position.liquidity = position
            .liquidity
            .checked_add(liquidity)
            .ok_or(MathError::Overflow)?;
        Ok(amounts)
    }

    fn burn(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError> {
        self.enter(PoolCall::Burn)?;
        let have = self
            .positions
            .get(&(tick_lower, tick_upper))
            .map(|position| position.liquidity)
            .ok_or(PoolError::NoPosition {
                tick_lower,
                tick_upper,
            })?;
        if liquidity > have {
            return Err(PoolError::InsufficientLiquidity {
                have,
                need: liquidity,
            });
        }
        if liquidity == 0 {
            return Ok((U256::ZERO, U256::ZERO));
        }

        let (amount0, amount1) = amounts_for_liquidity(
            self.sqrt_price_x96,
            sqrt_ratio_at_tick(tick_lower)?,
            sqrt_ratio_at_tick(tick_upper)?,
            liquidity,
            false,
        )?;
        self.apply_liquidity_delta(tick_lower, tick_upper, -i128_from(liquidity)?)?;
        if let Some(position) = self.positions.get_mut(&(tick_lower, tick_upper)) {
            position.liquidity -= liquidity;
            position.owed0 += amount0;
            position.owed1 += amount1;
        }
        Ok((amount0, amount1))
    }

    fn collect(&mut self, tick_lower: i32, tick_upper: i32) -> Result<(U256, U256), PoolError> {
        self.enter(PoolCall::Collect)?;
        let Some(position) = self.positions.get_mut(&(tick_lower, tick_upper)) else {
            return Ok((U256::ZERO, U256::ZERO));
        };
        let owed = (position.owed0, position.owed1);
        position.owed0 = U256::ZERO;
        position.owed1 = U256::ZERO;
        if position.liquidity == 0 {
            self.positions.remove(&(tick_lower, tick_upper));
        }
        Ok(owed)
    }

    fn swap(&mut self, amount_in: U256, zero_for_one: bool) -> Result<(U256, U256), PoolError> {
        self.enter(PoolCall::Swap)?;
        if amount_in.is_zero() {
            return Err(PoolError::ZeroSwap);
        }

        let limit = if zero_for_one {
            MIN_SQRT_RATIO + U256::from(1u64)
        } else {
            MAX_SQRT_RATIO - U256::from(1u64)
        };
        let mut remaining = amount_in;
        let mut amount_out = U256::ZERO;

        while !remaining.is_zero() && self.sqrt_price_x96 != limit {
            let next_tick = self.next_initialized_tick(zero_for_one);
            let target = match next_tick {
                Some(tick) => sqrt_ratio_at_tick(tick)?,
                None => limit,
            };
            let target = if zero_for_one {
                target.max(limit)
            } else {
                target.min(limit)
            };

            let step = self.compute_step(target, remaining, zero_for_one)?;
            remaining = remaining
                .checked_sub(step.amount_in + step.fee)
                .ok_or(MathError::Overflow)?;
            amount_out += step.amount_out;
            self.accrue_fees(step.fee, zero_for_one)?;
            self.sqrt_price_x96 = step.sqrt_price_next;

            match next_tick {
                Some(tick) if step.sqrt_price_next == target => {
                    let net = self.ticks.get(&tick).copied().unwrap_or(0);
                    let delta = if zero_for_one { -net } else { net };
                    self.liquidity = add_delta(self.liquidity, delta)?;
                    self.tick = if zero_for_one { tick - 1 } else { tick };
                }
                _ => {
                    self.tick = tick_at_sqrt_ratio(self.sqrt_price_x96)?;
                }
            }
        }

        let spent = amount_in - remaining;
        tracing::debug!(%spent, %amount_out, zero_for_one, tick = self.tick, "pool swap");
        Ok((spent, amount_out))
    }

    fn tokens_owed(&self, tick_lower: i32, tick_upper: i32) -> (U256, U256) {
        self.position(tick_lower, tick_upper)
            .map(|position| (position.owed0, position.owed1))
            .unwrap_or((U256::ZERO, U256::ZERO))
    }
}
