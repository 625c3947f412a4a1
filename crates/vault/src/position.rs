//! The vault's two liquidity ranges and the rebalance algorithm.
//!
//! [`PositionManager`] owns the base and limit [`Position`] records and is
//! the only code that talks to the pool about them. It never touches the
//! share ledger; callers pass idle balances in and get the updated balances
//! back, so a failed operation can be discarded wholesale.

use std::fmt;

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::fees::{FeePolicy, FeeSplit};
use crate::ledger::ShareFraction;
use crate::liquidity_math::{amounts_for_liquidity, liquidity_for_amounts};
use crate::pool::PoolAdapter;
use crate::tick_math::{is_aligned, sqrt_ratio_at_tick, MAX_TICK, MIN_TICK};

/// Which of the two ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Base,
    Limit,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Base => f.write_str("base"),
            Slot::Limit => f.write_str("limit"),
        }
    }
}

/// An active range. Replaced wholesale on every rebalance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl Position {
    /// Create a new position record
    pub fn new(tick_lower: i32, tick_upper: i32, liquidity: u128) -> Self {
        Self {
            tick_lower,
            tick_upper,
            liquidity,
        }
    }

    /// Whether the position covers exactly this range
    pub fn covers(&self, tick_lower: i32, tick_upper: i32) -> bool {
        self.tick_lower == tick_lower && self.tick_upper == tick_upper
    }

    /// Token amounts held by the position at `sqrt_price`, including uncollected tokens.
    pub fn amounts<P: PoolAdapter>(&self, pool: &P, sqrt_price: U256) -> Result<(U256, U256)> {
        let (amount0, amount1) = amounts_for_liquidity(
            sqrt_price,
            sqrt_ratio_at_tick(self.tick_lower)?,
            sqrt_ratio_at_tick(self.tick_upper)?,
            self.liquidity,
            false,
        )?;
        let (owed0, owed1) = pool.tokens_owed(self.tick_lower, self.tick_upper);
        Ok((amount0 + owed0, amount1 + owed1))
    }
}

/// Liquidity and token amounts of one range, as reported to readers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// A pair of token amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub amount0: U256,
    pub amount1: U256,
}

impl Balances {
    pub fn new(amount0: U256, amount1: U256) -> Self {
        Self { amount0, amount1 }
    }

    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }

    /// Component-wise sum.
    pub fn plus(self, amount0: U256, amount1: U256) -> Result<Self> {
        Ok(Self {
            amount0: self
                .amount0
                .checked_add(amount0)
                .ok_or(crate::math::MathError::Overflow)?,
            amount1: self
                .amount1
                .checked_add(amount1)
                .ok_or(crate::math::MathError::Overflow)?,
        })
    }

    /// Component-wise difference, failing with the token that runs short.
    pub fn minus(self, amount0: U256, amount1: U256, tokens: (Address, Address)) -> Result<Self> {
        let debit = |have: U256, need: U256, token: Address| {
            have.checked_sub(need)
                .ok_or(VaultError::InsufficientBalance { token, have, need })
        };
        Ok(Self {
            amount0: debit(self.amount0, amount0, tokens.0)?,
            amount1: debit(self.amount1, amount1, tokens.1)?,
        })
    }
}

/// Tokens released from the pool by a burn-and-collect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collected {
    /// Principal released by burning liquidity
    pub burned0: U256,
    pub burned1: U256,
    /// Everything else that was owed, i.e. swap fees
    pub fees0: U256,
    pub fees1: U256,
}

impl Collected {
    fn absorb(&mut self, burned: (U256, U256), collected: (U256, U256)) {
        self.burned0 += burned.0;
        self.burned1 += burned.1;
        self.fees0 += collected.0.saturating_sub(burned.0);
        self.fees1 += collected.1.saturating_sub(burned.1);
    }

    /// Principal plus fees.
    pub fn total(&self) -> (U256, U256) {
        (self.burned0 + self.fees0, self.burned1 + self.fees1)
    }
}

/// Arguments of a rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceParams {
    pub base_lower: i32,
    pub base_upper: i32,
    pub limit_lower: i32,
    pub limit_upper: i32,
    pub fee_recipient: Address,
    /// Positive swaps token0 for token1, negative token1 for token0, zero skips the swap
    pub swap_quantity: I256,
}

impl RebalanceParams {
    pub fn new(
        base_lower: i32,
        base_upper: i32,
        limit_lower: i32,
        limit_upper: i32,
        fee_recipient: Address,
    ) -> Self {
        Self {
            base_lower,
            base_upper,
            limit_lower,
            limit_upper,
            fee_recipient,
            swap_quantity: I256::ZERO,
        }
    }

    /// Set the corrective swap.
    pub fn with_swap(mut self, swap_quantity: I256) -> Self {
        self.swap_quantity = swap_quantity;
        self
    }

    /// Checks both ranges without touching the pool.
    pub fn validate(&self, tick_spacing: i32) -> Result<()> {
        validate_range(self.base_lower, self.base_upper, tick_spacing)?;
        validate_range(self.limit_lower, self.limit_upper, tick_spacing)?;
        if self.base_lower == self.limit_lower && self.base_upper == self.limit_upper {
            return Err(VaultError::InvalidRange {
                tick_lower: self.limit_lower,
                tick_upper: self.limit_upper,
            });
        }
        if self.fee_recipient == Address::ZERO {
            return Err(VaultError::InvalidRecipient(self.fee_recipient));
        }
        Ok(())
    }
}

/// The swap executed during a rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapFill {
    pub zero_for_one: bool,
    pub amount_in: U256,
    pub amount_out: U256,
}

/// Result of [`PositionManager::rebalance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceOutcome {
    /// Idle balances after the new ranges were minted
    pub idle: Balances,
    /// What the old ranges released
    pub collected: Collected,
    /// How the collected fees were routed
    pub fees: FeeSplit,
    pub swap: Option<SwapFill>,
    pub base: Position,
    pub limit: Position,
}

/// Checks that a range is ordered, aligned to the pool grid and inside tick bounds.
pub fn validate_range(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<()> {
    let valid = tick_lower < tick_upper
        && tick_lower >= MIN_TICK
        && tick_upper <= MAX_TICK
        && is_aligned(tick_lower, tick_spacing)
        && is_aligned(tick_upper, tick_spacing);
    if valid {
        Ok(())
    } else {
        Err(VaultError::InvalidRange {
            tick_lower,
            tick_upper,
        })
    }
}

/// Owner of the base and limit ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionManager {
    tokens: (Address, Address),
    base: Option<Position>,
    limit: Option<Position>,
}

impl PositionManager {
    /// Create a manager with no ranges for the given token pair.
    pub fn new(token0: Address, token1: Address) -> Self {
        Self {
            tokens: (token0, token1),
            base: None,
            limit: None,
        }
    }

    pub fn base(&self) -> Option<Position> {
        self.base
    }

    pub fn limit(&self) -> Option<Position> {
        self.limit
    }

    pub fn position(&self, slot: Slot) -> Option<Position> {
        match slot {
            Slot::Base => self.base,
            Slot::Limit => self.limit,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Position> {
        match slot {
            Slot::Base => &mut self.base,
            Slot::Limit => &mut self.limit,
        }
    }

    fn active(&self) -> impl Iterator<Item = (Slot, Position)> + '_ {
        [(Slot::Base, self.base), (Slot::Limit, self.limit)]
            .into_iter()
            .filter_map(|(slot, position)| position.map(|position| (slot, position)))
    }

    /// Token amounts held across both ranges, including uncollected tokens.
    pub fn holdings<P: PoolAdapter>(&self, pool: &P) -> Result<(U256, U256)> {
        let sqrt_price = pool.current_price()?;
        let mut total = Balances::default();
        for (_, position) in self.active() {
            let (amount0, amount1) = position.amounts(pool, sqrt_price)?;
            total = total.plus(amount0, amount1)?;
        }
        Ok((total.amount0, total.amount1))
    }

    /// Liquidity and amounts of one range; zeroes when the range was never opened.
    pub fn summary<P: PoolAdapter>(&self, pool: &P, slot: Slot) -> Result<PositionSummary> {
        let Some(position) = self.position(slot) else {
            return Ok(PositionSummary::default());
        };
        let (amount0, amount1) = position.amounts(pool, pool.current_price()?)?;
        Ok(PositionSummary {
            tick_lower: position.tick_lower,
            tick_upper: position.tick_upper,
            liquidity: position.liquidity,
            amount0,
            amount1,
        })
    }

    /// Burn all liquidity from both ranges and collect everything owed.
    pub fn withdraw_all<P: PoolAdapter>(&mut self, pool: &mut P) -> Result<Collected> {
        let mut collected = Collected::default();
        for (slot, position) in self.active().collect::<Vec<_>>() {
            let burned = if position.liquidity > 0 {
                pool.burn(position.tick_lower, position.tick_upper, position.liquidity)?
            } else {
                (U256::ZERO, U256::ZERO)
            };
            let owed = pool.collect(position.tick_lower, position.tick_upper)?;
            collected.absorb(burned, owed);
            tracing::debug!(%slot, liquidity = position.liquidity, "range withdrawn");
        }
        self.base = None;
        self.limit = None;
        Ok(collected)
    }

    /// Burn the same fraction of liquidity from both ranges and collect.
    pub fn burn_fraction<P: PoolAdapter>(
        &mut self,
        pool: &mut P,
        fraction: ShareFraction,
    ) -> Result<Collected> {
        let mut collected = Collected::default();
        for (slot, position) in self.active().collect::<Vec<_>>() {
            let liquidity = fraction.of_liquidity(position.liquidity)?;
            let burned = if liquidity > 0 {
                pool.burn(position.tick_lower, position.tick_upper, liquidity)?
            } else {
                (U256::ZERO, U256::ZERO)
            };
            let owed = pool.collect(position.tick_lower, position.tick_upper)?;
            collected.absorb(burned, owed);
            if let Some(tracked) = self.slot_mut(slot) {
                tracked.liquidity -= liquidity;
            }
        }
        Ok(collected)
    }

    /// Burn `liquidity` from an arbitrary range straight into the vault.
    ///
    /// A tracked range with the same bounds has its liquidity reduced.
    pub fn burn_range<P: PoolAdapter>(
        &mut self,
        pool: &mut P,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<Collected> {
        let burned = pool.burn(tick_lower, tick_upper, liquidity)?;
        let owed = pool.collect(tick_lower, tick_upper)?;
        let mut collected = Collected::default();
        collected.absorb(burned, owed);

        for slot in [Slot::Base, Slot::Limit] {
            if let Some(tracked) = self.slot_mut(slot) {
                if tracked.covers(tick_lower, tick_upper) {
                    tracked.liquidity = tracked.liquidity.saturating_sub(liquidity);
                }
            }
        }
        Ok(collected)
    }

    /// Mint the most liquidity `available` supports over a range.
    fn mint_max<P: PoolAdapter>(
        &self,
        pool: &mut P,
        tick_lower: i32,
        tick_upper: i32,
        available: Balances,
    ) -> Result<(u128, Balances)> {
        let liquidity = liquidity_for_amounts(
            pool.current_price()?,
            sqrt_ratio_at_tick(tick_lower)?,
            sqrt_ratio_at_tick(tick_upper)?,
            available.amount0,
            available.amount1,
        )?;
        if liquidity == 0 {
            return Ok((0, available));
        }
        let (paid0, paid1) = pool.mint(tick_lower, tick_upper, liquidity)?;
        Ok((liquidity, available.minus(paid0, paid1, self.tokens)?))
    }

    /// Deploy up to `(amount0, amount1)` of idle tokens into an existing range.
    ///
    /// Returns the liquidity added and the idle balances left over.
    pub fn add_liquidity<P: PoolAdapter>(
        &mut self,
        pool: &mut P,
        slot: Slot,
        amount0: U256,
        amount1: U256,
        idle: Balances,
    ) -> Result<(u128, Balances)> {
        let position = self
            .position(slot)
            .ok_or(VaultError::NoActivePosition { slot })?;
        let unused = idle.minus(amount0, amount1, self.tokens)?;
        let (liquidity, leftover) = self.mint_max(
            pool,
            position.tick_lower,
            position.tick_upper,
            Balances::new(amount0, amount1),
        )?;
        if let Some(tracked) = self.slot_mut(slot) {
            tracked.liquidity = tracked
                .liquidity
                .checked_add(liquidity)
                .ok_or(crate::math::MathError::Overflow)?;
        }
        Ok((liquidity, unused.plus(leftover.amount0, leftover.amount1)?))
    }

    /// Withdraw both ranges, route fees, optionally swap, then open the new ranges.
    ///
    /// `params` must already be validated. The base range is sized first from
    /// all idle tokens at the post-swap price; the limit range takes whatever
    /// the base left over, which is usually a single token.
    pub fn rebalance<P: PoolAdapter>(
        &mut self,
        pool: &mut P,
        params: &RebalanceParams,
        idle: Balances,
        policy: FeePolicy,
    ) -> Result<RebalanceOutcome> {
        let collected = self.withdraw_all(pool)?;
        let fees = policy.split(collected.fees0, collected.fees1);
        let mut idle = idle.plus(
            collected.burned0 + fees.compounded0,
            collected.burned1 + fees.compounded1,
        )?;

        let swap = if params.swap_quantity.is_zero() {
            None
        } else {
            let zero_for_one = params.swap_quantity.is_positive();
            let amount = params.swap_quantity.unsigned_abs();
            let (spend0, spend1) = if zero_for_one {
                (amount, U256::ZERO)
            } else {
                (U256::ZERO, amount)
            };
            idle = idle.minus(spend0, spend1, self.tokens)?;

            let (amount_in, amount_out) = pool.swap(amount, zero_for_one)?;
            let refund = amount
                .checked_sub(amount_in)
                .ok_or(crate::math::MathError::Overflow)?;
            idle = if zero_for_one {
                idle.plus(refund, amount_out)?
            } else {
                idle.plus(amount_out, refund)?
            };
            tracing::debug!(zero_for_one, %amount_in, %amount_out, "rebalance swap");
            Some(SwapFill {
                zero_for_one,
                amount_in,
                amount_out,
            })
        };

        let (base_liquidity, idle) =
            self.mint_max(pool, params.base_lower, params.base_upper, idle)?;
        let (limit_liquidity, idle) =
            self.mint_max(pool, params.limit_lower, params.limit_upper, idle)?;

        let base = Position::new(params.base_lower, params.base_upper, base_liquidity);
        let limit = Position::new(params.limit_lower, params.limit_upper, limit_liquidity);
        self.base = Some(base);
        self.limit = Some(limit);

        Ok(RebalanceOutcome {
            idle,
            collected,
            fees,
            swap,
            base,
            limit,
        })
    }
}
