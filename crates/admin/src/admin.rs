//! Permission-gated front end for vaults.
//!
//! An [`Admin`] is meant to own one or more vaults. It lets its advisor
//! drive liquidity management and its owner run configuration, emergency
//! recovery and the timelocked hand-over of a vault to a new owner. Every
//! vault call is made with the admin's own address as caller, so the vault's
//! owner check passes only while the admin still owns it.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use hypervisor_vault::{Hypervisor, PoolAdapter, RebalanceOutcome, RebalanceParams, Role};
use tracing::{debug, info, warn};

use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use crate::events::AdminEvent;
use crate::roles::Roles;
use crate::timelock::{OwnershipTransferRequest, Timelock};

/// Governance contract for hypervisor vaults.
#[derive(Debug, Clone)]
pub struct Admin {
    address: Address,
    roles: Roles,
    config: AdminConfig,
    timelock: Timelock,
    holdings: BTreeMap<Address, U256>,
    events: Vec<AdminEvent>,
}

impl Admin {
    /// Create an admin at `address` governed by `owner` and advised by `advisor`.
    pub fn new(address: Address, owner: Address, advisor: Address, config: AdminConfig) -> Result<Self> {
        Ok(Self {
            address,
            roles: Roles::new(owner, advisor)?,
            config,
            timelock: Timelock::new(),
            holdings: BTreeMap::new(),
            events: Vec::new(),
        })
    }

    /// Address the admin uses when calling vaults.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.roles.owner
    }

    pub fn advisor(&self) -> Address {
        self.roles.advisor
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// The pending ownership transfer for `vault`, if any.
    pub fn pending_transfer(&self, vault: Address) -> Option<&OwnershipTransferRequest> {
        self.timelock.pending(vault)
    }

    /// Tokens extracted from vaults and not yet rescued.
    pub fn holdings(&self, token: Address) -> U256 {
        self.holdings.get(&token).copied().unwrap_or(U256::ZERO)
    }

    pub fn events(&self) -> &[AdminEvent] {
        &self.events
    }

    /// Drain recorded events.
    pub fn take_events(&mut self) -> Vec<AdminEvent> {
        std::mem::take(&mut self.events)
    }

    // Advisor operations

    /// Rebalances `vault`. Advisor only.
    pub fn rebalance<P: PoolAdapter + Clone>(
        &self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        params: &RebalanceParams,
    ) -> Result<RebalanceOutcome> {
        self.roles.require(caller, Role::Advisor)?;
        Ok(vault.rebalance(self.address, params)?)
    }

    /// Pulls the fraction `shares / total_supply` of both ranges into idle balances. Advisor only.
    pub fn pull_liquidity<P: PoolAdapter + Clone>(
        &self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        shares: U256,
    ) -> Result<(U256, U256)> {
        self.roles.require(caller, Role::Advisor)?;
        Ok(vault.pull_liquidity(self.address, shares)?)
    }

    /// Deploys idle tokens into the base range. Advisor only.
    pub fn add_base_liquidity<P: PoolAdapter + Clone>(
        &self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        amount0: U256,
        amount1: U256,
    ) -> Result<u128> {
        self.roles.require(caller, Role::Advisor)?;
        Ok(vault.add_base_liquidity(self.address, amount0, amount1)?)
    }

    /// Deploys idle tokens into the limit range. Advisor only.
    pub fn add_limit_liquidity<P: PoolAdapter + Clone>(
        &self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        amount0: U256,
        amount1: U256,
    ) -> Result<u128> {
        self.roles.require(caller, Role::Advisor)?;
        Ok(vault.add_limit_liquidity(self.address, amount0, amount1)?)
    }

    // Owner operations

    pub fn set_deposit_max<P: PoolAdapter + Clone>(
        &self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        deposit_max0: U256,
        deposit_max1: U256,
    ) -> Result<()> {
        self.roles.require(caller, Role::Owner)?;
        Ok(vault.set_deposit_max(self.address, deposit_max0, deposit_max1)?)
    }

    pub fn set_max_total_supply<P: PoolAdapter + Clone>(
        &self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        max_total_supply: U256,
    ) -> Result<()> {
        self.roles.require(caller, Role::Owner)?;
        Ok(vault.set_max_total_supply(self.address, max_total_supply)?)
    }

    /// Replaces the advisor. Owner only.
    pub fn set_advisor(&mut self, caller: Address, new_advisor: Address) -> Result<()> {
        self.roles.require(caller, Role::Owner)?;
        if new_advisor == Address::ZERO {
            return Err(AdminError::InvalidRecipient(new_advisor));
        }
        let previous_advisor = self.roles.advisor;
        self.roles.advisor = new_advisor;
        self.events.push(AdminEvent::AdvisorUpdated {
            previous_advisor,
            new_advisor,
        });
        info!(admin = %self.address, %previous_advisor, %new_advisor, "advisor updated");
        Ok(())
    }

    /// Pulls idle tokens out of `vault` into the admin's holdings. Owner only.
    pub fn emergency_withdraw<P: PoolAdapter + Clone>(
        &mut self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        token: Address,
        amount: U256,
    ) -> Result<()> {
        self.roles.require(caller, Role::Owner)?;
        vault.emergency_withdraw(self.address, token, amount)?;
        *self.holdings.entry(token).or_insert(U256::ZERO) += amount;
        warn!(admin = %self.address, vault = %vault.address(), %token, %amount, "emergency withdraw");
        Ok(())
    }

    /// Burns liquidity from a vault range into the vault's idle balances. Owner only.
    pub fn emergency_burn<P: PoolAdapter + Clone>(
        &self,
        caller: Address,
        vault: &mut Hypervisor<P>,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(U256, U256)> {
        self.roles.require(caller, Role::Owner)?;
        Ok(vault.emergency_burn(self.address, tick_lower, tick_upper, liquidity)?)
    }

    /// Sends the admin's entire holding of `token` to `recipient`. Owner only.
    pub fn rescue_erc20(&mut self, caller: Address, token: Address, recipient: Address) -> Result<U256> {
        self.roles.require(caller, Role::Owner)?;
        if recipient == Address::ZERO {
            return Err(AdminError::InvalidRecipient(recipient));
        }
        let amount = self.holdings.remove(&token).unwrap_or(U256::ZERO);
        self.events.push(AdminEvent::TokensRescued {
            token,
            amount,
            recipient,
        });
        warn!(admin = %self.address, %token, %amount, %recipient, "tokens rescued");
        Ok(amount)
    }

    // Ownership transfer

    /// Proposes handing `vault` to `new_owner` once the delay has elapsed. Owner only.
    ///
    /// `now` is the caller's clock in seconds. Fails unless the admin
    /// currently owns `vault`. Under the default policy a second proposal
    /// replaces the first and restarts the delay.
    pub fn prepare<P>(
        &mut self,
        caller: Address,
        vault: &Hypervisor<P>,
        new_owner: Address,
        now: u64,
    ) -> Result<OwnershipTransferRequest> {
        self.roles.require(caller, Role::Owner)?;
        if vault.owner() != self.address {
            return Err(AdminError::PermissionDenied { role: Role::Owner });
        }
        if new_owner == Address::ZERO {
            return Err(AdminError::InvalidRecipient(new_owner));
        }

        let request = OwnershipTransferRequest {
            vault: vault.address(),
            proposed_new_owner: new_owner,
            proposer: caller,
            eligible_at: now.saturating_add(self.config.effective_delay()),
        };
        if let Some(superseded) = self.timelock.prepare(request, self.config.pending_policy)? {
            debug!(
                vault = %superseded.vault,
                new_owner = %superseded.proposed_new_owner,
                "pending transfer superseded"
            );
        }
        self.events.push(AdminEvent::OwnerTransferPrepared {
            vault: request.vault,
            new_owner,
            proposer: caller,
            eligible_at: request.eligible_at,
        });
        info!(vault = %request.vault, %new_owner, eligible_at = request.eligible_at, "ownership transfer prepared");
        Ok(request)
    }

    /// Withdraws the pending transfer for `vault`. Owner only.
    pub fn cancel(&mut self, caller: Address, vault: Address) -> Result<OwnershipTransferRequest> {
        self.roles.require(caller, Role::Owner)?;
        let request = self.timelock.cancel(vault)?;
        self.events.push(AdminEvent::OwnerTransferCancelled {
            vault,
            new_owner: request.proposed_new_owner,
        });
        info!(%vault, new_owner = %request.proposed_new_owner, "ownership transfer cancelled");
        Ok(request)
    }

    /// Completes a prepared transfer. Anyone may call this; the timelock is the gate.
    ///
    /// The request is cleared only once the vault has accepted the new
    /// owner, so a failure leaves it pending.
    pub fn fulfill<P: PoolAdapter + Clone>(
        &mut self,
        vault: &mut Hypervisor<P>,
        new_owner: Address,
        now: u64,
    ) -> Result<()> {
        let address = vault.address();
        let request = self.timelock.ready(address, new_owner, now)?;
        vault.transfer_ownership(self.address, request.proposed_new_owner)?;
        self.timelock.clear(address);
        self.events.push(AdminEvent::OwnerTransferFulfilled {
            vault: address,
            new_owner,
        });
        info!(vault = %address, %new_owner, "ownership transfer fulfilled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypervisor_vault::{SimPool, VaultConfig, VaultError};

    const ADMIN: Address = Address::with_last_byte(0xad);
    const VAULT: Address = Address::with_last_byte(0xaa);
    const TOKEN0: Address = Address::with_last_byte(0x10);
    const TOKEN1: Address = Address::with_last_byte(0x11);
    const OWNER: Address = Address::with_last_byte(1);
    const ADVISOR: Address = Address::with_last_byte(2);
    const BOB: Address = Address::with_last_byte(3);

    fn setup() -> (Admin, Hypervisor<SimPool>) {
        let admin = Admin::new(ADMIN, OWNER, ADVISOR, AdminConfig::default()).unwrap();
        let pool = SimPool::new(0, 60, 3000).unwrap();
        let vault = Hypervisor::new(VAULT, TOKEN0, TOKEN1, ADMIN, pool, VaultConfig::default());
        (admin, vault)
    }

    #[test]
    fn test_new_rejects_zero_roles() {
        assert!(Admin::new(ADMIN, Address::ZERO, ADVISOR, AdminConfig::default()).is_err());
        assert!(Admin::new(ADMIN, OWNER, Address::ZERO, AdminConfig::default()).is_err());
    }

    #[test]
    fn test_owner_dispatch() {
        let (admin, mut vault) = setup();
        assert_eq!(
            admin.set_deposit_max(ADVISOR, &mut vault, U256::from(1), U256::from(1)),
            Err(AdminError::PermissionDenied { role: Role::Owner })
        );
        admin
            .set_deposit_max(OWNER, &mut vault, U256::from(5), U256::from(6))
            .unwrap();
        assert_eq!(vault.deposit_max(), (U256::from(5), U256::from(6)));

        admin
            .set_max_total_supply(OWNER, &mut vault, U256::from(7))
            .unwrap();
        assert_eq!(vault.config().max_total_supply, U256::from(7));
    }

    #[test]
    fn test_advisor_dispatch() {
        let (admin, mut vault) = setup();
        assert_eq!(
            admin.pull_liquidity(OWNER, &mut vault, U256::from(1)),
            Err(AdminError::PermissionDenied { role: Role::Advisor })
        );
        assert_eq!(
            admin.add_base_liquidity(OWNER, &mut vault, U256::ZERO, U256::ZERO),
            Err(AdminError::PermissionDenied { role: Role::Advisor })
        );
        assert_eq!(
            admin.add_limit_liquidity(ADVISOR, &mut vault, U256::ZERO, U256::ZERO),
            Err(AdminError::Vault(VaultError::NoActivePosition {
                slot: hypervisor_vault::Slot::Limit
            }))
        );
    }

    #[test]
    fn test_set_advisor() {
        let (mut admin, _) = setup();
        assert!(admin.set_advisor(ADVISOR, BOB).is_err());
        assert_eq!(
            admin.set_advisor(OWNER, Address::ZERO),
            Err(AdminError::InvalidRecipient(Address::ZERO))
        );
        admin.set_advisor(OWNER, BOB).unwrap();
        assert_eq!(admin.advisor(), BOB);
        assert_eq!(admin.events()[0].name(), "AdvisorUpdated");
    }

    #[test]
    fn test_prepare_saturates_eligibility() {
        let (mut admin, vault) = setup();
        let request = admin.prepare(OWNER, &vault, BOB, u64::MAX - 10).unwrap();
        assert_eq!(request.eligible_at, u64::MAX);
    }

    #[test]
    fn test_rescue_with_nothing_held() {
        let (mut admin, _) = setup();
        assert_eq!(admin.rescue_erc20(OWNER, TOKEN0, BOB).unwrap(), U256::ZERO);
        assert_eq!(
            admin.rescue_erc20(OWNER, TOKEN0, Address::ZERO),
            Err(AdminError::InvalidRecipient(Address::ZERO))
        );
    }
}
