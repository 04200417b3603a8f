//! CLI integration tests

use std::process::{Command, Output};

fn fmaa(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fmaa"))
        .args(args)
        .env_remove("FMAA_API_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = fmaa(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("FMAA dashboard"), "Should show app name");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("metrics"), "Should show metrics command");
    assert!(stdout.contains("agents"), "Should show agents command");
    assert!(stdout.contains("sentiment"), "Should show sentiment command");
    assert!(
        stdout.contains("recommendations"),
        "Should show recommendations command"
    );
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = fmaa(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("fmaa"), "Should show binary name");
}

/// Test metrics list subcommand help
#[test]
fn test_metrics_list_help() {
    let output = fmaa(&["metrics", "list", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Metrics list help should succeed");
    assert!(stdout.contains("--service"), "Should show service option");
    assert!(stdout.contains("--start-date"), "Should show start-date option");
    assert!(
        stdout.contains("--aggregation"),
        "Should show aggregation option"
    );
}

/// Test metrics record subcommand help
#[test]
fn test_metrics_record_help() {
    let output = fmaa(&["metrics", "record", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Metrics record help should succeed");
    assert!(stdout.contains("--meta"), "Should show meta option");
}

/// Test agents create subcommand help
#[test]
fn test_agents_create_help() {
    let output = fmaa(&["agents", "create", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Agents create help should succeed");
    assert!(stdout.contains("--type"), "Should show type option");
    assert!(stdout.contains("--config"), "Should show config option");
}

/// Test agents list subcommand help
#[test]
fn test_agents_list_help() {
    let output = fmaa(&["agents", "list", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Agents list help should succeed");
    assert!(stdout.contains("--stats"), "Should show stats option");
}

/// Test recommendations generate subcommand help
#[test]
fn test_recommendations_generate_help() {
    let output = fmaa(&["recommendations", "generate", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        output.status.success(),
        "Recommendations generate help should succeed"
    );
    assert!(stdout.contains("--max-price"), "Should show max-price option");
    assert!(
        stdout.contains("--min-rating"),
        "Should show min-rating option"
    );
}

/// Test format option
#[test]
fn test_format_option() {
    let output = fmaa(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test api-url option
#[test]
fn test_api_url_option() {
    let output = fmaa(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("FMAA_API_URL"), "Should show env var");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = fmaa(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

/// Test missing required argument error handling
#[test]
fn test_missing_argument() {
    let output = fmaa(&["sentiment", "analyze"]);

    assert!(!output.status.success(), "Missing argument should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("error"),
        "Should show error about missing argument"
    );
}
