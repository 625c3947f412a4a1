//! The vault: pooled deposits managed as two concentrated-liquidity ranges.
//!
//! Every mutating call runs against a working copy of the vault (pool
//! adapter included) and only replaces the original once the whole
//! operation has succeeded. Gated calls take the caller's address and check
//! it against the vault owner; in a deployment the owner is an `Admin`
//! that applies the finer-grained role rules.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::VaultConfig;
use crate::error::{Result, Role, VaultError};
use crate::events::VaultEvent;
use crate::guard::ReentrancyGuard;
use crate::ledger::{ShareFraction, ShareLedger};
use crate::math::{token0_in_token1, MathError};
use crate::pool::PoolAdapter;
use crate::position::{
    Balances, PositionManager, PositionSummary, RebalanceOutcome, RebalanceParams, Slot,
};

/// Point-in-time view of a vault, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    pub address: Address,
    pub owner: Address,
    pub token0: Address,
    pub token1: Address,
    pub tick: i32,
    pub sqrt_price_x96: U256,
    pub total_supply: U256,
    pub total_amount0: U256,
    pub total_amount1: U256,
    pub idle: Balances,
    pub base: PositionSummary,
    pub limit: PositionSummary,
    pub deposit_max0: U256,
    pub deposit_max1: U256,
    pub max_total_supply: U256,
}

/// A two-range liquidity vault over a single pool.
#[derive(Debug, Clone)]
pub struct Hypervisor<P> {
    address: Address,
    token0: Address,
    token1: Address,
    owner: Address,
    pool: P,
    positions: PositionManager,
    ledger: ShareLedger,
    idle: Balances,
    config: VaultConfig,
    guard: ReentrancyGuard,
    events: Vec<VaultEvent>,
}

impl<P: PoolAdapter + Clone> Hypervisor<P> {
    /// Create an empty vault owned by `owner`.
    pub fn new(
        address: Address,
        token0: Address,
        token1: Address,
        owner: Address,
        pool: P,
        config: VaultConfig,
    ) -> Self {
        Self {
            address,
            token0,
            token1,
            owner,
            pool,
            positions: PositionManager::new(token0, token1),
            ledger: ShareLedger::new(),
            idle: Balances::default(),
            config,
            guard: ReentrancyGuard::new(),
            events: Vec::new(),
        }
    }

    fn only_owner(&self, caller: Address) -> Result<()> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(VaultError::PermissionDenied { role: Role::Owner })
        }
    }

    fn tokens(&self) -> (Address, Address) {
        (self.token0, self.token1)
    }

    /// Run `op` on a working copy and commit it only if `op` succeeds.
    ///
    /// The event log stays out of the copy; only events emitted by `op` are
    /// appended on commit.
    fn transact<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let _token = self.guard.enter()?;
        let history = std::mem::take(&mut self.events);
        let mut working = self.clone();
        match op(&mut working) {
            Ok(value) => {
                let emitted = std::mem::replace(&mut working.events, history);
                *self = working;
                self.events.extend(emitted);
                Ok(value)
            }
            Err(error) => {
                self.events = history;
                Err(error)
            }
        }
    }

    /// Deposits tokens and mints shares to `recipient`.
    ///
    /// Shares are priced at the pool's current price: the deposit is valued
    /// in token1 and issued pro-rata against the vault's total value before
    /// the deposit (1:1 for the first deposit).
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidRecipient`] for the zero address
    /// - [`VaultError::DepositCapExceeded`] if either token would exceed its cap
    /// - [`VaultError::DegenerateShareMint`] if the deposit is worth zero shares
    /// - [`VaultError::MaxTotalSupplyExceeded`] if the supply cap would be crossed
    pub fn deposit(
        &mut self,
        sender: Address,
        amount0: U256,
        amount1: U256,
        recipient: Address,
    ) -> Result<U256> {
        if recipient == Address::ZERO {
            return Err(VaultError::InvalidRecipient(recipient));
        }

        self.transact(|vault| {
            let sqrt_price = vault.pool.current_price()?;
            let (total0, total1) = vault.total_amounts()?;

            for (token, total, amount, cap) in [
                (vault.token0, total0, amount0, vault.config.deposit_max0),
                (vault.token1, total1, amount1, vault.config.deposit_max1),
            ] {
                let after = total.saturating_add(amount);
                if after > cap {
                    return Err(VaultError::DepositCapExceeded {
                        token,
                        total: after,
                        cap,
                    });
                }
            }

            let contributed = amount1
                .checked_add(token0_in_token1(amount0, sqrt_price)?)
                .ok_or(MathError::Overflow)?;
            let total_value = total1
                .checked_add(token0_in_token1(total0, sqrt_price)?)
                .ok_or(MathError::Overflow)?;
            let shares = vault.ledger.mint(recipient, contributed, total_value)?;

            let cap = vault.config.max_total_supply;
            let total_supply = vault.ledger.total_supply();
            if !cap.is_zero() && total_supply > cap {
                return Err(VaultError::MaxTotalSupplyExceeded { total_supply, cap });
            }

            vault.idle = vault.idle.plus(amount0, amount1)?;
            vault.events.push(VaultEvent::Deposit {
                sender,
                recipient,
                shares,
                amount0,
                amount1,
            });
            info!(vault = %vault.address, %recipient, %shares, %amount0, %amount1, "deposit");
            Ok(shares)
        })
    }

    /// Burns `shares` held by `sender` and pays the proportional tokens to `recipient`.
    ///
    /// The same fraction of liquidity is burned from both ranges. Fees owed
    /// on the ranges are collected into the vault first, so the withdrawer
    /// receives their share of them along with their share of idle tokens.
    pub fn withdraw(
        &mut self,
        sender: Address,
        shares: U256,
        recipient: Address,
    ) -> Result<(U256, U256)> {
        if shares.is_zero() {
            return Err(VaultError::ZeroShares);
        }
        if recipient == Address::ZERO {
            return Err(VaultError::InvalidRecipient(recipient));
        }

        self.transact(|vault| {
            let fraction = vault.ledger.burn(sender, shares)?;
            let collected = vault.positions.burn_fraction(&mut vault.pool, fraction)?;

            let idle = vault.idle.plus(collected.fees0, collected.fees1)?;
            let idle_share0 = fraction.of(idle.amount0)?;
            let idle_share1 = fraction.of(idle.amount1)?;
            vault.idle = idle.minus(idle_share0, idle_share1, vault.tokens())?;

            let amount0 = collected.burned0 + idle_share0;
            let amount1 = collected.burned1 + idle_share1;
            vault.events.push(VaultEvent::Withdraw {
                sender,
                recipient,
                shares,
                amount0,
                amount1,
            });
            info!(vault = %vault.address, %recipient, %shares, %amount0, %amount1, "withdraw");
            Ok((amount0, amount1))
        })
    }

    /// Re-centres the vault: withdraws both ranges, routes fees, optionally
    /// swaps, then opens the new base and limit ranges.
    ///
    /// Both ranges are validated before the pool is touched. Any pool failure
    /// leaves the previous ranges and balances in place.
    ///
    /// # Errors
    ///
    /// - [`VaultError::PermissionDenied`] if `caller` is not the owner
    /// - [`VaultError::InvalidRange`] for an inverted, misaligned, out of
    ///   bounds or duplicated range
    /// - [`VaultError::InvalidRecipient`] for a zero fee recipient
    /// - [`VaultError::PoolAdapter`] passed through from the pool
    pub fn rebalance(
        &mut self,
        caller: Address,
        params: &RebalanceParams,
    ) -> Result<RebalanceOutcome> {
        self.only_owner(caller)?;
        params.validate(self.pool.tick_spacing())?;

        self.transact(|vault| {
            let outcome =
                vault
                    .positions
                    .rebalance(&mut vault.pool, params, vault.idle, vault.config.fee_policy)?;
            vault.idle = outcome.idle;

            let tick = vault.pool.current_tick()?;
            let (total_amount0, total_amount1) = vault.total_amounts()?;
            if !(outcome.fees.skimmed0.is_zero() && outcome.fees.skimmed1.is_zero()) {
                vault.events.push(VaultEvent::FeesSkimmed {
                    recipient: params.fee_recipient,
                    amount0: outcome.fees.skimmed0,
                    amount1: outcome.fees.skimmed1,
                });
            }
            vault.events.push(VaultEvent::Rebalanced {
                tick,
                total_amount0,
                total_amount1,
                fee_amount0: outcome.collected.fees0,
                fee_amount1: outcome.collected.fees1,
                total_supply: vault.ledger.total_supply(),
            });
            info!(
                vault = %vault.address,
                tick,
                base_liquidity = outcome.base.liquidity,
                limit_liquidity = outcome.limit.liquidity,
                "rebalanced"
            );
            Ok(outcome)
        })
    }

    /// Burns the fraction `shares / total_supply` of both ranges into idle balances.
    pub fn pull_liquidity(&mut self, caller: Address, shares: U256) -> Result<(U256, U256)> {
        self.only_owner(caller)?;
        if shares.is_zero() {
            return Err(VaultError::ZeroShares);
        }
        let total_supply = self.ledger.total_supply();
        if shares > total_supply {
            return Err(VaultError::InsufficientShares {
                holder: self.address,
                have: total_supply,
                need: shares,
            });
        }

        self.transact(|vault| {
            let fraction = ShareFraction {
                shares,
                total_supply,
            };
            let collected = vault.positions.burn_fraction(&mut vault.pool, fraction)?;
            let (amount0, amount1) = collected.total();
            vault.idle = vault.idle.plus(amount0, amount1)?;
            vault.events.push(VaultEvent::LiquidityPulled {
                shares,
                amount0,
                amount1,
            });
            debug!(vault = %vault.address, %shares, "liquidity pulled");
            Ok((amount0, amount1))
        })
    }

    /// Deploys idle tokens into the current base range.
    pub fn add_base_liquidity(
        &mut self,
        caller: Address,
        amount0: U256,
        amount1: U256,
    ) -> Result<u128> {
        self.add_liquidity(caller, Slot::Base, amount0, amount1)
    }

    /// Deploys idle tokens into the current limit range.
    pub fn add_limit_liquidity(
        &mut self,
        caller: Address,
        amount0: U256,
        amount1: U256,
    ) -> Result<u128> {
        self.add_liquidity(caller, Slot::Limit, amount0, amount1)
    }

    fn add_liquidity(
        &mut self,
        caller: Address,
        slot: Slot,
        amount0: U256,
        amount1: U256,
    ) -> Result<u128> {
        self.only_owner(caller)?;
        self.transact(|vault| {
            let (liquidity, idle) =
                vault
                    .positions
                    .add_liquidity(&mut vault.pool, slot, amount0, amount1, vault.idle)?;
            vault.idle = idle;
            debug!(vault = %vault.address, %slot, liquidity, "liquidity added");
            Ok(liquidity)
        })
    }

    /// Updates the per-token deposit caps.
    pub fn set_deposit_max(
        &mut self,
        caller: Address,
        deposit_max0: U256,
        deposit_max1: U256,
    ) -> Result<()> {
        self.only_owner(caller)?;
        self.transact(|vault| {
            vault.config.deposit_max0 = deposit_max0;
            vault.config.deposit_max1 = deposit_max1;
            vault.events.push(VaultEvent::DepositCapUpdated {
                deposit_max0,
                deposit_max1,
            });
            info!(vault = %vault.address, %deposit_max0, %deposit_max1, "deposit cap updated");
            Ok(())
        })
    }

    /// Updates the share supply cap; zero removes it.
    pub fn set_max_total_supply(&mut self, caller: Address, max_total_supply: U256) -> Result<()> {
        self.only_owner(caller)?;
        self.transact(|vault| {
            vault.config.max_total_supply = max_total_supply;
            vault
                .events
                .push(VaultEvent::MaxTotalSupplyUpdated { max_total_supply });
            info!(vault = %vault.address, %max_total_supply, "max total supply updated");
            Ok(())
        })
    }

    /// Hands the vault to `new_owner` immediately.
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.only_owner(caller)?;
        if new_owner == Address::ZERO {
            return Err(VaultError::InvalidRecipient(new_owner));
        }
        self.transact(|vault| {
            let previous_owner = vault.owner;
            vault.owner = new_owner;
            vault.events.push(VaultEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            });
            info!(vault = %vault.address, %previous_owner, %new_owner, "ownership transferred");
            Ok(())
        })
    }

    /// Sends `amount` of an idle token to the owner.
    ///
    /// The extracted value leaves the share backing and is reported as an
    /// `EmergencyWithdrawal` event.
    pub fn emergency_withdraw(&mut self, caller: Address, token: Address, amount: U256) -> Result<()> {
        self.only_owner(caller)?;
        let (debit0, debit1) = if token == self.token0 {
            (amount, U256::ZERO)
        } else if token == self.token1 {
            (U256::ZERO, amount)
        } else {
            return Err(VaultError::UnsupportedToken { token });
        };

        self.transact(|vault| {
            vault.idle = vault.idle.minus(debit0, debit1, vault.tokens())?;
            vault.events.push(VaultEvent::EmergencyWithdrawal {
                token,
                amount,
                recipient: caller,
            });
            warn!(vault = %vault.address, %token, %amount, "emergency withdrawal");
            Ok(())
        })
    }

    /// Burns liquidity from a range straight into idle balances.
    pub fn emergency_burn(
        &mut self,
        caller: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256)> {
        self.only_owner(caller)?;
        self.transact(|vault| {
            let collected =
                vault
                    .positions
                    .burn_range(&mut vault.pool, tick_lower, tick_upper, liquidity)?;
            let (amount0, amount1) = collected.total();
            vault.idle = vault.idle.plus(amount0, amount1)?;
            vault.events.push(VaultEvent::EmergencyBurn {
                tick_lower,
                tick_upper,
                liquidity,
                amount0,
                amount1,
            });
            warn!(vault = %vault.address, tick_lower, tick_upper, liquidity, "emergency burn");
            Ok((amount0, amount1))
        })
    }

    /// Total token0 and token1 backing the shares: idle plus both ranges.
    pub fn total_amounts(&self) -> Result<(U256, U256)> {
        let (held0, held1) = self.positions.holdings(&self.pool)?;
        let total = self.idle.plus(held0, held1)?;
        Ok((total.amount0, total.amount1))
    }

    /// Liquidity and amounts of the base range.
    pub fn base_position(&self) -> Result<PositionSummary> {
        self.positions.summary(&self.pool, Slot::Base)
    }

    /// Liquidity and amounts of the limit range.
    pub fn limit_position(&self) -> Result<PositionSummary> {
        self.positions.summary(&self.pool, Slot::Limit)
    }

    /// Snapshot of balances, ranges and limits.
    pub fn state(&self) -> Result<VaultState> {
        let (total_amount0, total_amount1) = self.total_amounts()?;
        Ok(VaultState {
            address: self.address,
            owner: self.owner,
            token0: self.token0,
            token1: self.token1,
            tick: self.pool.current_tick()?,
            sqrt_price_x96: self.pool.current_price()?,
            total_supply: self.ledger.total_supply(),
            total_amount0,
            total_amount1,
            idle: self.idle,
            base: self.base_position()?,
            limit: self.limit_position()?,
            deposit_max0: self.config.deposit_max0,
            deposit_max1: self.config.deposit_max1,
            max_total_supply: self.config.max_total_supply,
        })
    }
}

impl<P> Hypervisor<P> {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn balance_of(&self, holder: Address) -> U256 {
        self.ledger.balance_of(holder)
    }

    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    pub fn ledger(&self) -> &ShareLedger {
        &self.ledger
    }

    pub fn positions(&self) -> &PositionManager {
        &self.positions
    }

    /// Tokens held by the vault outside any range.
    pub fn idle(&self) -> Balances {
        self.idle
    }

    pub fn deposit_max(&self) -> (U256, U256) {
        (self.config.deposit_max0, self.config.deposit_max1)
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Mutable pool access, for driving the market around the vault.
    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    /// Events of committed operations, oldest first.
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }
}
