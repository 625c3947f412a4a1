//! Test helper utilities for CLI integration tests.

#![allow(deprecated)] // Command::cargo_bin deprecation

use assert_cmd::Command;
use serde_json::Value;

/// Create a CLI command.
pub fn hypervisor_cmd() -> Command {
    Command::cargo_bin("hypervisor").unwrap()
}

/// Absolute path of a fixture file.
pub fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}.json", env!("CARGO_MANIFEST_DIR"), name)
}

/// Run `simulate` on a fixture with JSON output and parse the report.
pub fn simulate_json(name: &str) -> Value {
    let output = hypervisor_cmd()
        .args(["simulate", &fixture_path(name), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "simulate {name} failed");
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Step statuses of a JSON report, as `(status, kind)` pairs.
pub fn step_outcomes(report: &Value) -> Vec<(String, Option<String>)> {
    report["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| {
            (
                step["status"].as_str().unwrap().to_string(),
                step["kind"].as_str().map(str::to_string),
            )
        })
        .collect()
}
