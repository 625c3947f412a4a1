//! Error types for the admin crate.

use alloy_primitives::Address;
use hypervisor_vault::{Role, VaultError};
use thiserror::Error;

/// Errors that can occur during governance operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// Caller does not hold the required role.
    #[error("Permission denied: only {role}")]
    PermissionDenied { role: Role },

    /// The ownership transfer is not yet eligible.
    #[error("Timelock not elapsed: eligible at {eligible_at}, now {now}")]
    TimelockNotElapsed { eligible_at: u64, now: u64 },

    /// No ownership transfer is pending for the vault.
    #[error("No pending ownership transfer for {vault}")]
    NoPendingRequest { vault: Address },

    /// The pending transfer names a different new owner.
    #[error("Mismatched new owner: expected {expected}, got {got}")]
    MismatchedNewOwner { expected: Address, got: Address },

    /// A transfer is already pending and the policy forbids replacing it.
    #[error("Ownership transfer already pending for {vault} (eligible at {eligible_at})")]
    TransferAlreadyPending { vault: Address, eligible_at: u64 },

    /// Zero address used as an owner, advisor or recipient.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(Address),

    /// The vault rejected the dispatched call.
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),
}

impl AdminError {
    /// Stable variant name; vault failures report the vault's own kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "PermissionDenied",
            Self::TimelockNotElapsed { .. } => "TimelockNotElapsed",
            Self::NoPendingRequest { .. } => "NoPendingRequest",
            Self::MismatchedNewOwner { .. } => "MismatchedNewOwner",
            Self::TransferAlreadyPending { .. } => "TransferAlreadyPending",
            Self::InvalidRecipient(_) => "InvalidRecipient",
            Self::Vault(error) => error.kind(),
        }
    }
}

/// Result type alias for governance operations.
pub type Result<T> = std::result::Result<T, AdminError>;
