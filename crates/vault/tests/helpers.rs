//! Shared fixtures for vault integration tests.

use alloy_primitives::{Address, U256};
use hypervisor_vault::{Hypervisor, SimPool, VaultConfig};

pub const VAULT: Address = Address::with_last_byte(0xaa);
pub const TOKEN0: Address = Address::with_last_byte(0x10);
pub const TOKEN1: Address = Address::with_last_byte(0x11);
pub const OWNER: Address = Address::with_last_byte(0x01);
pub const ALICE: Address = Address::with_last_byte(0x02);
pub const BOB: Address = Address::with_last_byte(0x03);
pub const CAROL: Address = Address::with_last_byte(0x04);
pub const FEE_RECIPIENT: Address = Address::with_last_byte(0xfe);

/// `n` whole tokens with 18 decimals.
pub fn wad(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

/// A 0.3% pool at tick 0 with deep full-range liquidity.
pub fn deep_pool() -> SimPool {
    SimPool::new(0, 60, 3000)
        .unwrap()
        .with_background_liquidity(10u128.pow(24))
        .unwrap()
}

/// An empty vault owned by `OWNER` over [`deep_pool`].
pub fn new_vault(config: VaultConfig) -> Hypervisor<SimPool> {
    Hypervisor::new(VAULT, TOKEN0, TOKEN1, OWNER, deep_pool(), config)
}
