//! Error types for the vault library.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::MathError;
use crate::pool::PoolError;
use crate::position::Slot;

/// Capability a caller must hold for a gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Governs the vault and the emergency paths
    Owner,
    /// Allowed to trigger rebalances
    Advisor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => f.write_str("owner"),
            Role::Advisor => f.write_str("advisor"),
        }
    }
}

/// Errors that can occur during vault operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Caller does not hold the required role
    #[error("Permission denied: only {role}")]
    PermissionDenied { role: Role },

    /// A range is inverted, misaligned, out of bounds or collides with the other range
    #[error("Invalid range [{tick_lower}, {tick_upper}]")]
    InvalidRange { tick_lower: i32, tick_upper: i32 },

    /// A deposit would push the vault's holdings of a token above its cap
    #[error("Deposit cap exceeded for token {token}: {total} > {cap}")]
    DepositCapExceeded { token: Address, total: U256, cap: U256 },

    /// A deposit would push the share supply above the configured maximum
    #[error("Max total supply exceeded: {total_supply} > {cap}")]
    MaxTotalSupplyExceeded { total_supply: U256, cap: U256 },

    /// Holder tried to burn more shares than it owns
    #[error("Insufficient shares for {holder}: have {have}, need {need}")]
    InsufficientShares { holder: Address, have: U256, need: U256 },

    /// The deposit would be issued zero shares
    #[error("Degenerate share mint: deposit is worth zero shares")]
    DegenerateShareMint,

    /// Withdrawal of zero shares
    #[error("Cannot withdraw zero shares")]
    ZeroShares,

    /// Zero address used as a recipient
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(Address),

    /// Token is neither token0 nor token1 of the vault
    #[error("Unsupported token {token}")]
    UnsupportedToken { token: Address },

    /// Not enough idle balance of a token
    #[error("Insufficient balance of {token}: have {have}, need {need}")]
    InsufficientBalance { token: Address, have: U256, need: U256 },

    /// The range has never been opened by a rebalance
    #[error("No active {slot} position")]
    NoActivePosition { slot: Slot },

    /// An operation is already executing against this vault
    #[error("Reentrancy detected")]
    ReentrancyDetected,

    /// The pool adapter rejected a call
    #[error("Pool adapter failure: {0}")]
    PoolAdapter(#[from] PoolError),

    /// Fixed-point arithmetic failed
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl VaultError {
    /// Stable variant name, for reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "PermissionDenied",
            Self::InvalidRange { .. } => "InvalidRange",
            Self::DepositCapExceeded { .. } => "DepositCapExceeded",
            Self::MaxTotalSupplyExceeded { .. } => "MaxTotalSupplyExceeded",
            Self::InsufficientShares { .. } => "InsufficientShares",
            Self::DegenerateShareMint => "DegenerateShareMint",
            Self::ZeroShares => "ZeroShares",
            Self::InvalidRecipient(_) => "InvalidRecipient",
            Self::UnsupportedToken { .. } => "UnsupportedToken",
            Self::InsufficientBalance { .. } => "InsufficientBalance",
            Self::NoActivePosition { .. } => "NoActivePosition",
            Self::ReentrancyDetected => "ReentrancyDetected",
            Self::PoolAdapter(_) => "PoolAdapter",
            Self::Math(_) => "Math",
        }
    }
}

/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_names_role() {
        let error = VaultError::PermissionDenied { role: Role::Advisor };
        assert_eq!(error.to_string(), "Permission denied: only advisor");
        let error = VaultError::PermissionDenied { role: Role::Owner };
        assert_eq!(error.to_string(), "Permission denied: only owner");
    }

    #[test]
    fn test_invalid_range_display() {
        let error = VaultError::InvalidRange {
            tick_lower: 60,
            tick_upper: -60,
        };
        assert_eq!(error.to_string(), "Invalid range [60, -60]");
    }

    #[test]
    fn test_pool_error_converts() {
        let error: VaultError = PoolError::NoPosition {
            tick_lower: -120,
            tick_upper: 120,
        }
        .into();
        assert!(matches!(error, VaultError::PoolAdapter(_)));
        assert_eq!(
            error.to_string(),
            "Pool adapter failure: No position at [-120, 120]"
        );
    }

    #[test]
    fn test_no_active_position_display() {
        let error = VaultError::NoActivePosition { slot: Slot::Limit };
        assert_eq!(error.to_string(), "No active limit position");
    }

    #[test]
    fn test_kind() {
        assert_eq!(VaultError::ZeroShares.kind(), "ZeroShares");
        let error: VaultError = PoolError::ZeroSwap.into();
        assert_eq!(error.kind(), "PoolAdapter");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
    }
}
