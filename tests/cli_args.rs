//! Integration tests for CLI argument handling
//!
//! Tests the --view and --team flags and the config overrides from the
//! command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fplhelp"))
        .args(args)
        .output()
        .expect("Failed to execute fplhelp")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fplhelp"), "Help should mention fplhelp");
    assert!(stdout.contains("--view"), "Help should mention --view flag");
    assert!(stdout.contains("--team"), "Help should mention --team flag");
}

#[test]
fn test_version_flag_prints_version() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_view_prints_error_and_exits() {
    let output = run_cli(&["--view", "league"]);
    assert!(!output.status.success(), "Expected invalid view to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid view"),
        "Should print error message about invalid view: {}",
        stderr
    );
}

#[test]
fn test_non_numeric_team_is_rejected_by_parser() {
    let output = run_cli(&["--team", "abc"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value"), "clap should reject: {}", stderr);
}

#[test]
fn test_bad_environment_value_exits_before_ui() {
    let output = Command::new(env!("CARGO_BIN_EXE_fplhelp"))
        .env("FPLHELP_TIMEOUT_MS", "soon")
        .output()
        .expect("Failed to execute fplhelp");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("FPLHELP_TIMEOUT_MS"),
        "Should name the bad variable: {}",
        stderr
    );
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use std::time::Duration;

    use clap::Parser;
    use fplhelp::app::View;
    use fplhelp::cli::{Cli, StartupConfig};
    use fplhelp::config::Config;

    #[test]
    fn test_startup_config_from_cli_team_and_view() {
        let cli = Cli::parse_from(["fplhelp", "--team", "1234567", "--view", "suggestions"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.team_id, Some(1234567));
        assert_eq!(config.initial_view, Some(View::Suggestions));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "fplhelp",
            "--base-url",
            "http://fpl.local:9000",
            "--timeout-ms",
            "2500",
            "--retries",
            "5",
            "--concurrency",
            "8",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.base_url, "http://fpl.local:9000");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.api_prefix, "/api/v2");
    }
}
