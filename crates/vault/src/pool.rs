//! The pool the vault deploys liquidity into.
//!
//! [`PoolAdapter`] is the only surface through which the vault causes
//! external effects. Implementations report failures as [`PoolError`], which
//! the vault passes through unchanged as `VaultError::PoolAdapter`.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::MathError;

/// Identifies an adapter entry point, for logging and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolCall {
    Mint,
    Burn,
    Collect,
    Swap,
}

impl fmt::Display for PoolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolCall::Mint => "mint",
            PoolCall::Burn => "burn",
            PoolCall::Collect => "collect",
            PoolCall::Swap => "swap",
        };
        f.write_str(name)
    }
}

/// Errors raised by a pool adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No position exists for the range
    #[error("No position at [{tick_lower}, {tick_upper}]")]
    NoPosition { tick_lower: i32, tick_upper: i32 },

    /// Burn of more liquidity than the position holds
    #[error("Insufficient liquidity: have {have}, need {need}")]
    InsufficientLiquidity { have: u128, need: u128 },

    /// Mint of zero liquidity
    #[error("Cannot mint zero liquidity")]
    ZeroLiquidity,

    /// Swap of zero amount
    #[error("Cannot swap zero amount")]
    ZeroSwap,

    /// Range is inverted or off the tick grid
    #[error("Range [{tick_lower}, {tick_upper}] is not valid for this pool")]
    InvalidRange { tick_lower: i32, tick_upper: i32 },

    /// The call was rejected by the pool
    #[error("Pool rejected {0}")]
    Rejected(PoolCall),

    /// Fixed-point arithmetic failed inside the pool
    #[error("Pool math error: {0}")]
    Math(#[from] MathError),
}

/// Concentrated-liquidity pool primitives consumed by the vault.
///
/// Positions are keyed by range and belong to the caller; the vault is the
/// only owner an adapter instance serves. `burn` credits the released tokens
/// as owed, `collect` pays out everything owed (burned principal plus fees).
pub trait PoolAdapter {
    /// Tick grid of the pool.
    fn tick_spacing(&self) -> i32;

    /// Current Q64.96 square-root price.
    fn current_price(&self) -> Result<U256, PoolError>;

    /// Current tick.
    fn current_tick(&self) -> Result<i32, PoolError>;

    /// Adds `liquidity` to the range, returning the token amounts paid in.
    fn mint(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError>;

    /// Removes `liquidity` from the range, crediting the released amounts as owed.
    /// Burning zero liquidity refreshes the position's fees.
    fn burn(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256), PoolError>;

    /// Pays out everything owed on the range.
    fn collect(&mut self, tick_lower: i32, tick_upper: i32) -> Result<(U256, U256), PoolError>;

    /// Swaps exactly `amount_in` of the input token, returning `(amount_in, amount_out)`.
    fn swap(&mut self, amount_in: U256, zero_for_one: bool) -> Result<(U256, U256), PoolError>;

    /// Tokens owed on the range but not yet collected.
    fn tokens_owed(&self, tick_lower: i32, tick_upper: i32) -> (U256, U256);
}
