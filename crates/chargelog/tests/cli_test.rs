//! Integration tests for the `chargelog` binary.
//!
//! These cover argument parsing, help output, shell completions, config
//! file handling and early error exits -- none of them log in.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `chargelog` binary with env isolation.
///
/// Clears all `CHARGELOG_*` env vars, runs inside `dir` and points config
/// directories into it so tests never touch the user's real setup.
fn chargelog_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("chargelog");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("CHARGELOG_CONFIG")
        .env_remove("CHARGELOG_USERNAME")
        .env_remove("CHARGELOG_PASSWORD")
        .env_remove("CHARGELOG_CONNECT__USERNAME")
        .env_remove("CHARGELOG_CONNECT__PASSWORD")
        .env_remove("CHARGELOG_CONNECT__POLL_INTERVAL");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    chargelog_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("charging")
                .and(predicate::str::contains("--username"))
                .and(predicate::str::contains("--influx"))
                .and(predicate::str::contains("--csv-folder"))
                .and(predicate::str::contains("config")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    chargelog_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chargelog"));
}

#[test]
fn test_conflicting_csv_flags_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = chargelog_cmd(dir.path())
        .args(["--csv", "--no-csv"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    chargelog_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chargelog"));
}

#[test]
fn test_completions_invalid_shell() {
    let dir = tempfile::tempdir().unwrap();
    chargelog_cmd(dir.path())
        .args(["completions", "tcsh"])
        .assert()
        .failure();
}

// ── Early errors ────────────────────────────────────────────────────

#[test]
fn test_missing_username_exits_with_auth_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = chargelog_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("No username"), "unexpected output:\n{text}");
}

#[test]
fn test_interval_below_five_seconds_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = chargelog_cmd(dir.path())
        .args(["-u", "driver@example.com", "-p", "secret", "-i", "3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("connect.poll_interval"),
        "unexpected output:\n{text}"
    );
}

#[test]
fn test_invalid_influx_host_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = chargelog_cmd(dir.path())
        .args([
            "-u",
            "driver@example.com",
            "-p",
            "secret",
            "--influx",
            "--influx-host",
            "not a url",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("influxdb.host"));
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    chargelog_cmd(dir.path())
        .args(["config", "path", "--config", "/etc/chargelog/custom.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/chargelog/custom.toml"));
}

#[test]
fn test_config_path_prefers_local_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chargelog.toml"), "").unwrap();
    chargelog_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::diff("chargelog.toml\n"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("chargelog.toml");

    chargelog_cmd(dir.path())
        .args(["config", "init", "--config"])
        .arg(&file)
        .args(["-u", "driver@example.com", "--influx"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("username = \"driver@example.com\""));
    assert!(written.contains("[influxdb]"));

    chargelog_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("driver@example.com")
                .and(predicate::str::contains("sampledb"))
                .and(predicate::str::contains("(not stored)")),
        );
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chargelog.toml"), "[csv]\nenabled = false\n").unwrap();

    let output = chargelog_cmd(dir.path())
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("already exists"));

    chargelog_cmd(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_masks_plaintext_password() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("chargelog.toml"),
        "[connect]\nusername = \"driver@example.com\"\npassword = \"hunter2\"\n",
    )
    .unwrap();

    chargelog_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****").and(predicate::str::contains("hunter2").not()));
}
