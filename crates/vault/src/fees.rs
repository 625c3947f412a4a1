//! What happens to swap fees collected during a rebalance.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Fee routing, kept apart from liquidity sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeePolicy {
    /// All fees stay in the vault and accrue to every shareholder
    #[default]
    Compound,
    /// `fees / divisor` of each token goes to the rebalance's fee recipient
    Skim { divisor: u64 },
}

/// Fees split between the vault and the fee recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub compounded0: U256,
    pub compounded1: U256,
    pub skimmed0: U256,
    pub skimmed1: U256,
}

impl FeePolicy {
    /// Split collected fees according to the policy.
    pub fn split(&self, fees0: U256, fees1: U256) -> FeeSplit {
        match *self {
            FeePolicy::Skim { divisor } if divisor > 0 => {
                let divisor = U256::from(divisor);
                let skimmed0 = fees0 / divisor;
                let skimmed1 = fees1 / divisor;
                FeeSplit {
                    compounded0: fees0 - skimmed0,
                    compounded1: fees1 - skimmed1,
                    skimmed0,
                    skimmed1,
                }
            }
            _ => FeeSplit {
                compounded0: fees0,
                compounded1: fees1,
                ..FeeSplit::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_keeps_everything() {
        let split = FeePolicy::Compound.split(U256::from(100), U256::from(7));
        assert_eq!(split.compounded0, U256::from(100));
        assert_eq!(split.compounded1, U256::from(7));
        assert_eq!(split.skimmed0, U256::ZERO);
        assert_eq!(split.skimmed1, U256::ZERO);
    }

    #[test]
    fn test_skim_tenth() {
        let split = FeePolicy::Skim { divisor: 10 }.split(U256::from(105), U256::from(9));
        assert_eq!(split.skimmed0, U256::from(10));
        assert_eq!(split.compounded0, U256::from(95));
        assert_eq!(split.skimmed1, U256::ZERO);
        assert_eq!(split.compounded1, U256::from(9));
    }

    #[test]
    fn test_zero_divisor_compounds() {
        let split = FeePolicy::Skim { divisor: 0 }.split(U256::from(5), U256::from(5));
        assert_eq!(split.skimmed0, U256::ZERO);
        assert_eq!(split.compounded0, U256::from(5));
    }

    #[test]
    fn test_policy_json() {
        let policy: FeePolicy = serde_json::from_str(r#"{"kind":"skim","divisor":10}"#).unwrap();
        assert_eq!(policy, FeePolicy::Skim { divisor: 10 });
        assert_eq!(
            serde_json::to_string(&FeePolicy::Compound).unwrap(),
            r#"{"kind":"compound"}"#
        );
    }
}
