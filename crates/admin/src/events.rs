//! Governance notifications.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// An observable governance state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AdminEvent {
    OwnerTransferPrepared {
        vault: Address,
        new_owner: Address,
        proposer: Address,
        eligible_at: u64,
    },
    OwnerTransferCancelled {
        vault: Address,
        new_owner: Address,
    },
    OwnerTransferFulfilled {
        vault: Address,
        new_owner: Address,
    },
    AdvisorUpdated {
        previous_advisor: Address,
        new_advisor: Address,
    },
    TokensRescued {
        token: Address,
        amount: U256,
        recipient: Address,
    },
}

impl AdminEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AdminEvent::OwnerTransferPrepared { .. } => "OwnerTransferPrepared",
            AdminEvent::OwnerTransferCancelled { .. } => "OwnerTransferCancelled",
            AdminEvent::OwnerTransferFulfilled { .. } => "OwnerTransferFulfilled",
            AdminEvent::AdvisorUpdated { .. } => "AdvisorUpdated",
            AdminEvent::TokensRescued { .. } => "TokensRescued",
        }
    }
}
