//! Integration tests for the `thermolink` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! offline replay, config management, and error exit codes, all without a
//! sensor attached.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `thermolink` binary with env isolation.
///
/// Clears all `THERMOLINK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn thermolink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("thermolink");
    cmd.env("HOME", "/tmp/thermolink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/thermolink-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("THERMOLINK_PROFILE")
        .env_remove("THERMOLINK_PORT")
        .env_remove("THERMOLINK_BAUD")
        .env_remove("THERMOLINK_CONFIG")
        .env_remove("THERMOLINK_OUTPUT");
    cmd
}

/// Same as [`thermolink_cmd`] but with `--config` pointing into `dir`.
fn with_config(dir: &Path) -> assert_cmd::Command {
    let mut cmd = thermolink_cmd();
    cmd.arg("--config").arg(dir.join("config.toml"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const CAPTURE: &str = "24.50,60.20\n25.1,59\nabc,60.2\n24.5,60.2,1\n";

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = thermolink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    thermolink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("temperature and humidity")
            .and(predicate::str::contains("monitor"))
            .and(predicate::str::contains("ports"))
            .and(predicate::str::contains("replay")),
    );
}

#[test]
fn test_short_help_uses_about() {
    thermolink_cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Read temperature and humidity from a serial sensor",
        ));
}

#[test]
fn test_version_flag() {
    thermolink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("thermolink"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    thermolink_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    thermolink_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = thermolink_cmd().arg("foobar").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_monitor_count_must_be_positive() {
    thermolink_cmd()
        .args(["monitor", "--count", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_monitor_zero_baud_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    with_config(dir.path())
        .args(["--baud", "0", "--port", "/dev/thermolink-test-missing", "monitor"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("baud"));
}

#[test]
fn test_monitor_missing_port_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_config(dir.path())
        .args(["--port", "/dev/thermolink-test-missing", "monitor"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    let text = combined_output(&output);
    assert!(
        text.contains("/dev/thermolink-test-missing"),
        "Expected the port in the error:\n{text}"
    );
}

// ── Replay ──────────────────────────────────────────────────────────

#[test]
fn test_replay_stdin_plain() {
    thermolink_cmd()
        .args(["replay", "--output", "plain"])
        .write_stdin(CAPTURE)
        .assert()
        .success()
        .stdout("24.5,60.2\n25.1,59.0\n")
        .stderr(predicate::str::contains("2 readings, 2 malformed lines skipped"));
}

#[test]
fn test_replay_file_json() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.txt");
    std::fs::write(&capture, "24.5\r\n20.0,40.0\r\n").unwrap();

    let output = thermolink_cmd()
        .args(["-o", "json-compact", "replay"])
        .arg(&capture)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        r#"[{"line":2,"temperature":20.0,"humidity":40.0}]"#
    );
}

#[test]
fn test_replay_table_has_headers() {
    thermolink_cmd()
        .arg("replay")
        .write_stdin(CAPTURE)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Temperature")
                .and(predicate::str::contains("Humidity"))
                .and(predicate::str::contains("24.5")),
        );
}

#[test]
fn test_replay_missing_file_fails() {
    thermolink_cmd()
        .args(["replay", "/tmp/thermolink-cli-test-nonexistent/capture.txt"])
        .assert()
        .code(1);
}

#[test]
fn test_quiet_replay_prints_nothing() {
    thermolink_cmd()
        .args(["-q", "replay"])
        .write_stdin(CAPTURE)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    with_config(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_path_defaults_to_platform_dir() {
    thermolink_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("thermolink"));
}

#[test]
fn test_config_set_then_show() {
    let dir = tempfile::tempdir().unwrap();

    with_config(dir.path())
        .args(["config", "set", "port", "/dev/ttyACM0"])
        .assert()
        .success();
    with_config(dir.path())
        .args(["config", "set", "baud_rate", "115200"])
        .assert()
        .success();

    with_config(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("port = \"/dev/ttyACM0\""))
                .and(predicate::str::contains("baud_rate = 115200")),
        );
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    with_config(dir.path())
        .args(["config", "set", "parity", "even"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("parity"));
}

#[test]
fn test_config_use_switches_default_profile() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[profiles.bench]\nport = \"/dev/ttyUSB1\"\n\n[profiles.greenhouse]\nport = \"/dev/ttyACM0\"\n",
    )
    .unwrap();

    with_config(dir.path())
        .args(["config", "use", "greenhouse"])
        .assert()
        .success();

    with_config(dir.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greenhouse *"));
}

#[test]
fn test_config_use_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_config(dir.path())
        .args(["config", "use", "attic"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("attic"), "Expected profile name in error:\n{text}");
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[defaults]\nbaud_rate = 0\n").unwrap();

    with_config(dir.path())
        .args(["config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("baud_rate"));
}
