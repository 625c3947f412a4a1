//! CLI argument validation tests.
//!
//! These tests verify that the CLI properly validates arguments and provides
//! helpful error messages.

use predicates::prelude::*;

use super::helpers::hypervisor_cmd;

#[test]
fn test_help_output() {
    hypervisor_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hypervisor"))
        .stdout(predicate::str::contains("simulate"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("quote"));
}

#[test]
fn test_simulate_help() {
    hypervisor_cmd()
        .args(["simulate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--strict"));
}

#[test]
fn test_plan_help() {
    hypervisor_cmd()
        .args(["plan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--base-width"))
        .stdout(predicate::str::contains("--limit-width"))
        .stdout(predicate::str::contains("--tolerance-bps"));
}

#[test]
fn test_invalid_command() {
    hypervisor_cmd()
        .arg("invalid_command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_simulate_missing_scenario() {
    hypervisor_cmd()
        .arg("simulate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_plan_missing_amounts() {
    hypervisor_cmd()
        .args(["plan", "--tick=0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_invalid_amount() {
    hypervisor_cmd()
        .args(["plan", "--tick=0", "--amount0", "lots", "--amount1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_output_format() {
    hypervisor_cmd()
        .args(["plan", "--tick=0", "--amount0", "1", "--amount1", "1", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
