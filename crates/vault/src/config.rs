//! Vault configuration.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::fees::FeePolicy;

/// Limits and policies a vault starts with.
///
/// Caps default to unlimited; `max_total_supply` of zero means no supply cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Maximum token0 the vault may hold after a deposit.
    pub deposit_max0: U256,
    /// Maximum token1 the vault may hold after a deposit.
    pub deposit_max1: U256,
    /// Maximum share supply after a deposit, zero for none.
    pub max_total_supply: U256,
    /// Routing of fees collected during rebalances.
    pub fee_policy: FeePolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            deposit_max0: U256::MAX,
            deposit_max1: U256::MAX,
            max_total_supply: U256::ZERO,
            fee_policy: FeePolicy::default(),
        }
    }
}

impl VaultConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-token deposit caps.
    pub fn with_deposit_max(mut self, deposit_max0: U256, deposit_max1: U256) -> Self {
        self.deposit_max0 = deposit_max0;
        self.deposit_max1 = deposit_max1;
        self
    }

    /// Set the share supply cap.
    pub fn with_max_total_supply(mut self, max_total_supply: U256) -> Self {
        self.max_total_supply = max_total_supply;
        self
    }

    /// Set the fee policy.
    pub fn with_fee_policy(mut self, fee_policy: FeePolicy) -> Self {
        self.fee_policy = fee_policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unlimited() {
        let config = VaultConfig::new();
        assert_eq!(config.deposit_max0, U256::MAX);
        assert_eq!(config.max_total_supply, U256::ZERO);
        assert_eq!(config.fee_policy, FeePolicy::Compound);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: VaultConfig =
            serde_json::from_str(r#"{"deposit_max0":"0x64","fee_policy":{"kind":"skim","divisor":10}}"#)
                .unwrap();
        assert_eq!(config.deposit_max0, U256::from(100));
        assert_eq!(config.deposit_max1, U256::MAX);
        assert_eq!(config.fee_policy, FeePolicy::Skim { divisor: 10 });
    }
}
