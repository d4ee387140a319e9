//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs. Each test run uses its own user id
//! so the completion sets start empty.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "mealstreak-cli", "--"])
        .args(args)
        .env("MEALSTREAK_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn unique_user(tag: &str) -> String {
    format!("e2e-{tag}-{}", std::process::id())
}

#[test]
fn test_tokens_status_is_json() {
    let user = unique_user("status");
    let (stdout, _, code) = run_cli(&["tokens", "status", "--user", &user]);
    assert_eq!(code, 0, "tokens status failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("status is not JSON");
    assert!(json.get("totalTokens").is_some());
    assert!(json.get("currentStreak").is_some());
}

#[test]
fn test_complete_meal_awards_a_tenth() {
    let user = unique_user("meal");
    let (stdout, _, code) = run_cli(&[
        "tokens",
        "complete-meal",
        "Monday",
        "breakfast",
        "--user",
        &user,
    ]);
    assert_eq!(code, 0, "complete-meal failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["totalTokens"], 0.1);
}

#[test]
fn test_complete_meal_rejects_unknown_day() {
    let (_, stderr, code) = run_cli(&["tokens", "complete-meal", "Someday", "breakfast"]);
    assert_ne!(code, 0, "unknown day should fail");
    assert!(stderr.contains("Invalid day of week"));
}

#[test]
fn test_complete_day_twice_fails_second_time() {
    let user = unique_user("day");
    let (_, _, first) = run_cli(&["tokens", "complete-day", "Tuesday", "--user", &user]);
    assert_eq!(first, 0, "first complete-day failed");
    let (_, stderr, second) = run_cli(&["tokens", "complete-day", "Tuesday", "--user", &user]);
    assert_ne!(second, 0, "second complete-day should fail");
    assert!(stderr.contains("already completed"));
}

#[test]
fn test_redeem_donate_needs_balance() {
    let user = unique_user("redeem");
    let (_, stderr, code) = run_cli(&["redeem", "donate", "--user", &user]);
    assert_ne!(code, 0, "donate with empty balance should fail");
    assert!(stderr.contains("Not enough tokens"));
}

#[test]
fn test_redeem_list_is_json_array() {
    let user = unique_user("list");
    let (stdout, _, code) = run_cli(&["redeem", "list", "--user", &user]);
    assert_eq!(code, 0, "redeem list failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json.is_array());
}

#[test]
fn test_config_show_and_get() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json["rewards"].get("donate_cost").is_some());

    let (stdout, _, code) = run_cli(&["config", "get", "rewards.consult_cost"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "30");
}
