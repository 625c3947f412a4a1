//! Scenario replay through `hypervisor simulate`.

use alloy_primitives::{Address, U256};
use hypervisor_vault::VaultState;
use predicates::prelude::*;

use super::helpers::{fixture_path, hypervisor_cmd, simulate_json, step_outcomes};

fn final_state(report: &serde_json::Value) -> VaultState {
    serde_json::from_value(report["final_state"].clone()).unwrap()
}

#[test]
fn test_simulate_basic_table() {
    hypervisor_cmd()
        .args(["simulate", &fixture_path("basic")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deposit, rebalance, trade, withdraw"))
        .stdout(predicate::str::contains("deposit"))
        .stdout(predicate::str::contains("rebalance"))
        .stdout(predicate::str::contains("withdraw"))
        .stdout(predicate::str::contains("Final state"))
        .stdout(predicate::str::contains("Total supply: 0"));
}

#[test]
fn test_simulate_basic_json() {
    let report = simulate_json("basic");

    let outcomes = step_outcomes(&report);
    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|(status, kind)| status == "ok" && kind.is_none()));

    let events: Vec<&str> = report["vault_events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["event"].as_str().unwrap())
        .collect();
    assert_eq!(events, vec!["deposit", "rebalanced", "withdraw"]);

    let state = final_state(&report);
    assert_eq!(state.total_supply, U256::ZERO);
    assert_eq!(state.owner, Address::with_last_byte(0xad));
    assert_eq!(report["clock"], 1_700_000_000u64);
}

#[test]
fn test_simulate_timelock() {
    let report = simulate_json("timelock");

    let outcomes = step_outcomes(&report);
    let kinds: Vec<Option<&str>> = outcomes.iter().map(|(_, kind)| kind.as_deref()).collect();
    assert_eq!(
        kinds,
        vec![
            None,
            Some("TimelockNotElapsed"),
            None,
            None,
            Some("NoPendingRequest")
        ]
    );

    let state = final_state(&report);
    assert_eq!(state.owner, Address::with_last_byte(4));

    let admin_events: Vec<&str> = report["admin_events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["event"].as_str().unwrap())
        .collect();
    assert_eq!(
        admin_events,
        vec!["owner_transfer_prepared", "owner_transfer_fulfilled"]
    );
}

#[test]
fn test_simulate_caps_and_emergency() {
    let report = simulate_json("capped");

    let kinds: Vec<Option<String>> = step_outcomes(&report)
        .into_iter()
        .map(|(_, kind)| kind)
        .collect();
    assert_eq!(
        kinds,
        vec![None, Some("DepositCapExceeded".to_string()), None, None, None]
    );

    let state = final_state(&report);
    assert_eq!(state.deposit_max0, U256::from(2000));
    assert_eq!(state.total_amount0, U256::from(1000));
    assert_eq!(state.total_amount1, U256::from(600));
}

#[test]
fn test_simulate_caps_table_shows_extracted() {
    hypervisor_cmd()
        .args(["simulate", &fixture_path("capped")])
        .assert()
        .success()
        .stdout(predicate::str::contains("DepositCapExceeded"))
        .stdout(predicate::str::contains("Admin holds:  200 / 0"));
}

#[test]
fn test_simulate_strict_fails_on_error_step() {
    hypervisor_cmd()
        .args(["simulate", &fixture_path("capped"), "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step 1 (deposit) failed"))
        .stderr(predicate::str::contains("Deposit cap exceeded"));
}

#[test]
fn test_simulate_strict_passes_clean_scenario() {
    hypervisor_cmd()
        .args(["simulate", &fixture_path("basic"), "--strict"])
        .assert()
        .success();
}

#[test]
fn test_simulate_missing_file() {
    hypervisor_cmd()
        .args(["simulate", "does/not/exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read scenario"));
}

#[test]
fn test_simulate_unknown_action() {
    hypervisor_cmd()
        .args(["simulate", &fixture_path("unknown_action")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid scenario"));
}
