//! Share accounting.
//!
//! Shares are issued pro-rata to contributed value and burned on withdrawal.
//! The ledger only records balances; valuing the vault and moving tokens is
//! the caller's job.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::math::mul_div_down;

/// Per-holder share balances plus the total supply.
///
/// `sum(balances) == total_supply` holds after every call, and holders whose
/// balance drops to zero are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    balances: BTreeMap<Address, U256>,
    total_supply: U256,
}

/// A holder's pro-rata claim, captured at burn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareFraction {
    /// Shares burned
    pub shares: U256,
    /// Total supply before the burn
    pub total_supply: U256,
}

impl ShareFraction {
    /// The claim's portion of `amount`, rounded down.
    pub fn of(&self, amount: U256) -> Result<U256> {
        Ok(mul_div_down(amount, self.shares, self.total_supply)?)
    }

    /// The claim's portion of `liquidity`, rounded down.
    pub fn of_liquidity(&self, liquidity: u128) -> Result<u128> {
        let portion = self.of(U256::from(liquidity))?;
        // shares <= total_supply, so the portion never exceeds the input.
        Ok(portion.saturating_to::<u128>())
    }
}

impl ShareLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares held by `holder`.
    pub fn balance_of(&self, holder: Address) -> U256 {
        self.balances.get(&holder).copied().unwrap_or(U256::ZERO)
    }

    /// Total shares outstanding.
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Holders with a nonzero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.balances.iter()
    }

    /// Shares that `contributed_value` would be issued.
    ///
    /// The first deposit sets a 1:1 rate. Afterwards issuance is
    /// `contributed_value * total_supply / total_value_before`, truncated.
    pub fn shares_for(&self, contributed_value: U256, total_value_before: U256) -> Result<U256> {
        let shares = if self.total_supply.is_zero() {
            contributed_value
        } else if total_value_before.is_zero() {
            return Err(VaultError::DegenerateShareMint);
        } else {
            mul_div_down(contributed_value, self.total_supply, total_value_before)?
        };

        if shares.is_zero() {
            return Err(VaultError::DegenerateShareMint);
        }
        Ok(shares)
    }

    /// Issue shares for `contributed_value` to `recipient`.
    pub fn mint(
        &mut self,
        recipient: Address,
        contributed_value: U256,
        total_value_before: U256,
    ) -> Result<U256> {
        let shares = self.shares_for(contributed_value, total_value_before)?;
        let total_supply = self
            .total_supply
            .checked_add(shares)
            .ok_or(crate::math::MathError::Overflow)?;

        *self.balances.entry(recipient).or_insert(U256::ZERO) += shares;
        self.total_supply = total_supply;
        Ok(shares)
    }

    /// Burn `shares` from `holder`, returning the fraction of the vault they represented.
    pub fn burn(&mut self, holder: Address, shares: U256) -> Result<ShareFraction> {
        let have = self.balance_of(holder);
        if shares > have {
            return Err(VaultError::InsufficientShares {
                holder,
                have,
                need: shares,
            });
        }

        let fraction = ShareFraction {
            shares,
            total_supply: self.total_supply,
        };
        let remaining = have - shares;
        if remaining.is_zero() {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, remaining);
        }
        self.total_supply -= shares;
        Ok(fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use proptest::prelude::*;

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
    const BOB: Address = address!("0000000000000000000000000000000000000b0b");

    #[test]
    fn test_first_mint_is_one_to_one() {
        let mut ledger = ShareLedger::new();
        let shares = ledger.mint(ALICE, U256::from(2000), U256::ZERO).unwrap();
        assert_eq!(shares, U256::from(2000));
        assert_eq!(ledger.total_supply(), U256::from(2000));
        assert_eq!(ledger.balance_of(ALICE), U256::from(2000));
    }

    #[test]
    fn test_later_mint_is_pro_rata() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, U256::from(1000), U256::ZERO).unwrap();
        // Vault value doubled since the first deposit.
        let shares = ledger
            .mint(BOB, U256::from(1000), U256::from(2000))
            .unwrap();
        assert_eq!(shares, U256::from(500));
        assert_eq!(ledger.total_supply(), U256::from(1500));
    }

    #[test]
    fn test_degenerate_mint() {
        let mut ledger = ShareLedger::new();
        assert_eq!(
            ledger.mint(ALICE, U256::ZERO, U256::ZERO),
            Err(VaultError::DegenerateShareMint)
        );

        ledger.mint(ALICE, U256::from(1), U256::ZERO).unwrap();
        // A donation inflated the vault: 1 share is now worth 1e6.
        assert_eq!(
            ledger.mint(BOB, U256::from(999_999), U256::from(1_000_000)),
            Err(VaultError::DegenerateShareMint)
        );
        assert_eq!(
            ledger.mint(BOB, U256::from(10), U256::ZERO),
            Err(VaultError::DegenerateShareMint)
        );
        assert_eq!(ledger.total_supply(), U256::from(1));
    }

    #[test]
    fn test_burn() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, U256::from(300), U256::ZERO).unwrap();
        ledger.mint(BOB, U256::from(100), U256::from(300)).unwrap();

        let fraction = ledger.burn(ALICE, U256::from(100)).unwrap();
        assert_eq!(fraction.total_supply, U256::from(400));
        assert_eq!(fraction.of(U256::from(1000)).unwrap(), U256::from(250));
        assert_eq!(fraction.of_liquidity(1000).unwrap(), 250);
        assert_eq!(ledger.balance_of(ALICE), U256::from(200));
        assert_eq!(ledger.total_supply(), U256::from(300));
    }

    #[test]
    fn test_burn_insufficient() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, U256::from(10), U256::ZERO).unwrap();
        let before = ledger.clone();
        assert_eq!(
            ledger.burn(ALICE, U256::from(11)),
            Err(VaultError::InsufficientShares {
                holder: ALICE,
                have: U256::from(10),
                need: U256::from(11),
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_burn_all_removes_holder() {
        let mut ledger = ShareLedger::new();
        ledger.mint(ALICE, U256::from(10), U256::ZERO).unwrap();
        ledger.burn(ALICE, U256::from(10)).unwrap();
        assert_eq!(ledger.total_supply(), U256::ZERO);
        assert_eq!(ledger.holders().count(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Mint(u8, u64),
        Burn(u8, u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4, 1u64..1_000_000).prop_map(|(holder, value)| Op::Mint(holder, value)),
            (0u8..4, 0u64..1_000_000).prop_map(|(holder, shares)| Op::Burn(holder, shares)),
        ]
    }

    proptest! {
        #[test]
        fn prop_balances_sum_to_supply(ops in proptest::collection::vec(op(), 1..40)) {
            let mut ledger = ShareLedger::new();
            for op in ops {
                match op {
                    Op::Mint(holder, value) => {
                        // Value tracks supply 1:1 in this model.
                        let total_value = ledger.total_supply();
                        let _ = ledger.mint(Address::with_last_byte(holder), U256::from(value), total_value);
                    }
                    Op::Burn(holder, shares) => {
                        let _ = ledger.burn(Address::with_last_byte(holder), U256::from(shares));
                    }
                }
                let sum = ledger.holders().fold(U256::ZERO, |acc, (_, balance)| acc + *balance);
                prop_assert_eq!(sum, ledger.total_supply());
                prop_assert_eq!(ledger.total_supply().is_zero(), ledger.holders().count() == 0);
                prop_assert!(ledger.holders().all(|(_, balance)| !balance.is_zero()));
            }
        }
    }
}
