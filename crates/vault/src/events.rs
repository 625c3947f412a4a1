//! State-change notifications emitted by the vault.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// An observable vault state change. Events are only recorded for operations
/// that commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VaultEvent {
    Deposit {
        sender: Address,
        recipient: Address,
        shares: U256,
        amount0: U256,
        amount1: U256,
    },
    Withdraw {
        sender: Address,
        recipient: Address,
        shares: U256,
        amount0: U256,
        amount1: U256,
    },
    Rebalanced {
        tick: i32,
        total_amount0: U256,
        total_amount1: U256,
        fee_amount0: U256,
        fee_amount1: U256,
        total_supply: U256,
    },
    /// Fees paid to the rebalance's fee recipient under a skim policy
    FeesSkimmed {
        recipient: Address,
        amount0: U256,
        amount1: U256,
    },
    LiquidityPulled {
        shares: U256,
        amount0: U256,
        amount1: U256,
    },
    DepositCapUpdated {
        deposit_max0: U256,
        deposit_max1: U256,
    },
    MaxTotalSupplyUpdated {
        max_total_supply: U256,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    EmergencyWithdrawal {
        token: Address,
        amount: U256,
        recipient: Address,
    },
    EmergencyBurn {
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
        amount0: U256,
        amount1: U256,
    },
}

impl VaultEvent {
    /// Short name of the event, as used in logs and tables.
    pub fn name(&self) -> &'static str {
        match self {
            VaultEvent::Deposit { .. } => "Deposit",
            VaultEvent::Withdraw { .. } => "Withdraw",
            VaultEvent::Rebalanced { .. } => "Rebalanced",
            VaultEvent::FeesSkimmed { .. } => "FeesSkimmed",
            VaultEvent::LiquidityPulled { .. } => "LiquidityPulled",
            VaultEvent::DepositCapUpdated { .. } => "DepositCapUpdated",
            VaultEvent::MaxTotalSupplyUpdated { .. } => "MaxTotalSupplyUpdated",
            VaultEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
            VaultEvent::EmergencyWithdrawal { .. } => "EmergencyWithdrawal",
            VaultEvent::EmergencyBurn { .. } => "EmergencyBurn",
        }
    }
}
