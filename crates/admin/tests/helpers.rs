//! Shared fixtures for admin integration tests.

use alloy_primitives::{Address, U256};
use hypervisor_admin::{Admin, AdminConfig};
use hypervisor_vault::{Hypervisor, SimPool, VaultConfig};

pub const ADMIN: Address = Address::with_last_byte(0xad);
pub const VAULT: Address = Address::with_last_byte(0xaa);
pub const TOKEN0: Address = Address::with_last_byte(0x10);
pub const TOKEN1: Address = Address::with_last_byte(0x11);
pub const OWNER: Address = Address::with_last_byte(0x01);
pub const ADVISOR: Address = Address::with_last_byte(0x02);
pub const BOB: Address = Address::with_last_byte(0x03);
pub const CAROL: Address = Address::with_last_byte(0x04);
pub const DEPOSITOR: Address = Address::with_last_byte(0x05);

/// Start of every test clock.
pub const T0: u64 = 1_700_000_000;

pub fn wad(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

/// An admin governing a vault that already deposited 1000 of each token.
///
/// The vault is deployed by `OWNER` and handed to the admin, as a factory would.
pub fn setup(config: AdminConfig) -> (Admin, Hypervisor<SimPool>) {
    let admin = Admin::new(ADMIN, OWNER, ADVISOR, config).unwrap();
    let pool = SimPool::new(0, 60, 3000)
        .unwrap()
        .with_background_liquidity(10u128.pow(24))
        .unwrap();
    let mut vault = Hypervisor::new(
        VAULT,
        TOKEN0,
        TOKEN1,
        OWNER,
        pool,
        VaultConfig::new().with_deposit_max(wad(100_000), wad(100_000)),
    );
    vault
        .deposit(DEPOSITOR, wad(1000), wad(1000), DEPOSITOR)
        .unwrap();
    vault.transfer_ownership(OWNER, ADMIN).unwrap();
    (admin, vault)
}
