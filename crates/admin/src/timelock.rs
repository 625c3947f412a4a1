//! Pending ownership transfers.
//!
//! At most one request exists per vault. A request is created by `prepare`,
//! and removed by `fulfill` or `cancel`; eligibility is checked lazily against
//! the time the caller supplies.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::config::PendingTransferPolicy;
use crate::error::{AdminError, Result};

/// A proposed change of vault owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferRequest {
    pub vault: Address,
    pub proposed_new_owner: Address,
    pub proposer: Address,
    /// Earliest time, in seconds, at which the transfer may be fulfilled
    pub eligible_at: u64,
}

/// Pending requests keyed by vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timelock {
    pending: BTreeMap<Address, OwnershipTransferRequest>,
}

impl Timelock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending request for `vault`, if any.
    pub fn pending(&self, vault: Address) -> Option<&OwnershipTransferRequest> {
        self.pending.get(&vault)
    }

    /// Records `request`, returning the request it superseded.
    pub fn prepare(
        &mut self,
        request: OwnershipTransferRequest,
        policy: PendingTransferPolicy,
    ) -> Result<Option<OwnershipTransferRequest>> {
        if let Some(existing) = self.pending.get(&request.vault) {
            if policy == PendingTransferPolicy::RejectWhilePending {
                return Err(AdminError::TransferAlreadyPending {
                    vault: request.vault,
                    eligible_at: existing.eligible_at,
                });
            }
        }
        Ok(self.pending.insert(request.vault, request))
    }

    /// Drops the pending request for `vault`.
    pub fn cancel(&mut self, vault: Address) -> Result<OwnershipTransferRequest> {
        self.pending
            .remove(&vault)
            .ok_or(AdminError::NoPendingRequest { vault })
    }

    /// The pending request for `vault` if it names `new_owner` and is eligible at `now`.
    pub fn ready(
        &self,
        vault: Address,
        new_owner: Address,
        now: u64,
    ) -> Result<OwnershipTransferRequest> {
        let request = self
            .pending
            .get(&vault)
            .ok_or(AdminError::NoPendingRequest { vault })?;
        if request.proposed_new_owner != new_owner {
            return Err(AdminError::MismatchedNewOwner {
                expected: request.proposed_new_owner,
                got: new_owner,
            });
        }
        if now < request.eligible_at {
            return Err(AdminError::TimelockNotElapsed {
                eligible_at: request.eligible_at,
                now,
            });
        }
        Ok(*request)
    }

    /// Removes a fulfilled request.
    pub fn clear(&mut self, vault: Address) -> Option<OwnershipTransferRequest> {
        self.pending.remove(&vault)
    }
}
