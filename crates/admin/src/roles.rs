//! Who may do what.

use alloy_primitives::Address;
use hypervisor_vault::Role;
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};

/// Current holders of the owner and advisor roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub owner: Address,
    pub advisor: Address,
}

impl Roles {
    /// Both identities must be nonzero.
    pub fn new(owner: Address, advisor: Address) -> Result<Self> {
        for address in [owner, advisor] {
            if address == Address::ZERO {
                return Err(AdminError::InvalidRecipient(address));
            }
        }
        Ok(Self { owner, advisor })
    }

    /// The holder of `role`.
    pub fn holder(&self, role: Role) -> Address {
        match role {
            Role::Owner => self.owner,
            Role::Advisor => self.advisor,
        }
    }

    /// Fails with `PermissionDenied` unless `caller` holds `role`.
    pub fn require(&self, caller: Address, role: Role) -> Result<()> {
        if self.holder(role) == caller {
            Ok(())
        } else {
            Err(AdminError::PermissionDenied { role })
        }
    }
}
