//! Owner-only recovery paths.

mod helpers;

use alloy_primitives::U256;
use helpers::{setup, wad, ADMIN, ADVISOR, BOB, DEPOSITOR, OWNER, TOKEN0, TOKEN1};
use hypervisor_admin::{AdminConfig, AdminError, AdminEvent};
use hypervisor_vault::{PoolError, RebalanceParams, Role, VaultError};

#[test]
fn test_emergency_withdraw_is_owner_only() {
    let (mut admin, mut vault) = setup(AdminConfig::default());
    assert_eq!(
        admin.emergency_withdraw(ADVISOR, &mut vault, TOKEN0, wad(1)),
        Err(AdminError::PermissionDenied { role: Role::Owner })
    );

    admin
        .emergency_withdraw(OWNER, &mut vault, TOKEN0, wad(1000))
        .unwrap();
    assert_eq!(vault.idle().amount0, U256::ZERO);
    assert_eq!(admin.holdings(TOKEN0), wad(1000));
}

#[test]
fn test_extracted_value_is_rescued_not_lost() {
    let (mut admin, mut vault) = setup(AdminConfig::default());
    admin
        .emergency_withdraw(OWNER, &mut vault, TOKEN1, wad(400))
        .unwrap();
    admin
        .emergency_withdraw(OWNER, &mut vault, TOKEN1, wad(100))
        .unwrap();

    let (_, total1) = vault.total_amounts().unwrap();
    assert_eq!(total1 + admin.holdings(TOKEN1), wad(1000));

    assert!(admin.rescue_erc20(ADVISOR, TOKEN1, BOB).is_err());
    let rescued = admin.rescue_erc20(OWNER, TOKEN1, BOB).unwrap();
    assert_eq!(rescued, wad(500));
    assert_eq!(admin.holdings(TOKEN1), U256::ZERO);
    assert_eq!(
        admin.events().last(),
        Some(&AdminEvent::TokensRescued {
            token: TOKEN1,
            amount: wad(500),
            recipient: BOB
        })
    );
}

#[test]
fn test_emergency_withdraw_vault_errors() {
    let (mut admin, mut vault) = setup(AdminConfig::default());
    assert_eq!(
        admin.emergency_withdraw(OWNER, &mut vault, BOB, wad(1)),
        Err(AdminError::Vault(VaultError::UnsupportedToken { token: BOB }))
    );
    assert!(matches!(
        admin.emergency_withdraw(OWNER, &mut vault, TOKEN0, wad(1001)),
        Err(AdminError::Vault(VaultError::InsufficientBalance { .. }))
    ));
    assert_eq!(admin.holdings(TOKEN0), U256::ZERO);
}

#[test]
fn test_emergency_burn_without_position() {
    let (admin, mut vault) = setup(AdminConfig::default());
    assert_eq!(
        admin.emergency_burn(OWNER, &mut vault, -120, 120, 0),
        Err(AdminError::Vault(VaultError::PoolAdapter(PoolError::NoPosition {
            tick_lower: -120,
            tick_upper: 120
        })))
    );
}

#[test]
fn test_emergency_burn_closes_base() {
    let (admin, mut vault) = setup(AdminConfig::default());
    admin
        .rebalance(ADVISOR, &mut vault, &RebalanceParams::new(-120, 120, -60, 0, BOB))
        .unwrap();
    let liquidity = vault.base_position().unwrap().liquidity;

    assert!(admin
        .emergency_burn(ADVISOR, &mut vault, -120, 120, liquidity)
        .is_err());
    let (amount0, amount1) = admin
        .emergency_burn(OWNER, &mut vault, -120, 120, liquidity)
        .unwrap();
    assert_eq!(vault.base_position().unwrap().liquidity, 0);
    assert_eq!(vault.idle().amount0, amount0);
    assert_eq!(vault.idle().amount1, amount1);

    // Shares still redeem for everything the vault holds.
    let shares = vault.balance_of(DEPOSITOR);
    let (out0, out1) = vault.withdraw(DEPOSITOR, shares, DEPOSITOR).unwrap();
    assert_eq!((out0, out1), (amount0, amount1));
}

#[test]
fn test_advisor_liquidity_management() {
    let (admin, mut vault) = setup(AdminConfig::default());
    admin
        .rebalance(ADVISOR, &mut vault, &RebalanceParams::new(-120, 120, -60, 0, BOB))
        .unwrap();
    let shares = vault.total_supply();

    let (pulled0, pulled1) = admin
        .pull_liquidity(ADVISOR, &mut vault, shares / U256::from(4))
        .unwrap();
    assert!(pulled0 > U256::ZERO && pulled1 > U256::ZERO);

    let added = admin
        .add_base_liquidity(ADVISOR, &mut vault, pulled0, pulled1)
        .unwrap();
    assert!(added > 0);
    assert!(admin
        .add_base_liquidity(OWNER, &mut vault, U256::ZERO, U256::ZERO)
        .is_err());
    assert_eq!(vault.owner(), ADMIN);
}
