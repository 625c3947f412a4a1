//! Hypervisor vault library
//!
//! This crate implements a vault that pools deposits of two tokens and
//! deploys them into a concentrated-liquidity pool as two ranges: a wide
//! "base" range and a narrower, usually single-sided "limit" range.
//!
//! # Overview
//!
//! - [`ShareLedger`] issues shares pro-rata to contributed value
//! - [`PositionManager`] owns the two ranges and runs the rebalance algorithm
//! - [`Hypervisor`] orchestrates deposits, withdrawals, caps and emergency
//!   recovery, committing each operation atomically
//! - [`PoolAdapter`] is the pool interface; [`SimPool`] is an exact in-memory
//!   implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use alloy_primitives::{Address, U256};
//! use hypervisor_vault::{Hypervisor, RebalanceParams, SimPool, VaultConfig};
//!
//! let pool = SimPool::new(0, 60, 3000)?.with_background_liquidity(10u128.pow(24))?;
//! let mut vault = Hypervisor::new(vault_address, token0, token1, owner, pool, VaultConfig::default());
//!
//! let shares = vault.deposit(alice, amount0, amount1, alice)?;
//! vault.rebalance(owner, &RebalanceParams::new(-120, 120, -60, 0, fee_recipient))?;
//! let (out0, out1) = vault.withdraw(alice, shares, alice)?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod fees;
pub mod guard;
pub mod ledger;
pub mod liquidity_math;
pub mod math;
pub mod pool;
pub mod position;
pub mod sim_pool;
pub mod tick_math;
pub mod vault;

// Re-export commonly used types
pub use config::VaultConfig;
pub use error::{Result, Role, VaultError};
pub use events::VaultEvent;
pub use fees::{FeePolicy, FeeSplit};
pub use guard::{GuardToken, ReentrancyGuard};
pub use ledger::{ShareFraction, ShareLedger};
pub use math::{MathError, RoundingDirection, PRECISION, Q96};
pub use pool::{PoolAdapter, PoolCall, PoolError};
pub use position::{
    Balances, Collected, Position, PositionManager, PositionSummary, RebalanceOutcome,
    RebalanceParams, Slot, SwapFill,
};
pub use sim_pool::{PoolObserver, PoolPosition, SimPool, FEE_DENOMINATOR};
pub use tick_math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
pub use vault::{Hypervisor, VaultState};
