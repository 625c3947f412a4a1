//! `plan` and `quote` commands.

use predicates::prelude::*;
use serde_json::Value;

use super::helpers::hypervisor_cmd;

fn json_stdout(args: &[&str]) -> Value {
    let output = hypervisor_cmd().args(args).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_plan_token0_excess_json() {
    let plan = json_stdout(&[
        "plan", "--tick=0", "--amount0", "3000", "--amount1", "1000", "--format", "json",
    ]);
    assert_eq!(plan["base_lower"], -1200);
    assert_eq!(plan["base_upper"], 1200);
    assert_eq!(plan["limit_lower"], 0);
    assert_eq!(plan["limit_upper"], 600);
    assert_eq!(plan["excess"], "token0");
    assert_eq!(plan["excess_ratio"], "0.75");
    assert_eq!(plan["swap_quantity"], "1000");
}

#[test]
fn test_plan_negative_tick_and_custom_widths() {
    let plan = json_stdout(&[
        "plan",
        "--tick=-90",
        "--spacing",
        "10",
        "--base-width",
        "100",
        "--limit-width",
        "50",
        "--amount0",
        "0",
        "--amount1",
        "500",
        "--format",
        "json",
    ]);
    assert_eq!(plan["base_lower"], -190);
    assert_eq!(plan["base_upper"], 10);
    assert_eq!(plan["limit_lower"], -140);
    assert_eq!(plan["limit_upper"], -90);
    assert_eq!(plan["excess"], "token1");
    assert_eq!(plan["swap_quantity"], "-250");
}

#[test]
fn test_plan_table() {
    hypervisor_cmd()
        .args(["plan", "--tick=0", "--amount0", "1000", "--amount1", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Base range"))
        .stdout(predicate::str::contains("[-1200, 1200]"))
        .stdout(predicate::str::contains("Balanced"));
}

#[test]
fn test_plan_rejects_misaligned_width() {
    hypervisor_cmd()
        .args([
            "plan",
            "--tick=0",
            "--base-width",
            "90",
            "--amount0",
            "1",
            "--amount1",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a positive multiple"));
}

#[test]
fn test_quote_symmetric_range() {
    hypervisor_cmd()
        .args([
            "quote",
            "--tick=0",
            "--lower=-120",
            "--upper=120",
            "--amount0",
            "1000000000000000000000",
            "--amount1",
            "1000000000000000000000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("167175499835819766909277"))
        .stdout(predicate::str::contains("[-120, 120]"));
}

#[test]
fn test_quote_above_range_uses_token0_only() {
    let quote = json_stdout(&[
        "quote",
        "--tick=-200",
        "--lower=-120",
        "--upper=120",
        "--amount0",
        "1000000",
        "--amount1",
        "1000000",
        "--format",
        "json",
    ]);
    assert!(quote["liquidity"].as_u64().unwrap() > 0);
    assert_eq!(quote["leftover1"], "0xf4240");
}

#[test]
fn test_quote_rejects_inverted_range() {
    hypervisor_cmd()
        .args([
            "quote",
            "--tick=0",
            "--lower=120",
            "--upper=-120",
            "--amount0",
            "1",
            "--amount1",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be below"));
}
