//! Integration tests for the `bodhi` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! configuration handling, and error exit codes. One test drives a full
//! command against a mocked command bridge.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NO_HOME: &str = "/tmp/bodhi-cli-test-nonexistent";

/// Build a [`Command`] for the `bodhi` binary with env isolation.
///
/// Clears all `BODHI_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn bodhi_cmd() -> assert_cmd::Command {
    bodhi_cmd_with_config_home(NO_HOME)
}

fn bodhi_cmd_with_config_home(config_home: &str) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bodhi");
    cmd.env("HOME", config_home)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("BODHI_PROFILE")
        .env_remove("BODHI_BACKEND")
        .env_remove("BODHI_OUTPUT")
        .env_remove("BODHI_TIMEOUT")
        .env_remove("BODHI_DB_PASSWORD")
        .env_remove("BODHI_DEFAULT_PROFILE")
        .env_remove("RUST_LOG");
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
fn test_no_args_shows_help() {
    let output = bodhi_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    bodhi_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("migration")
            .and(predicate::str::contains("connections"))
            .and(predicate::str::contains("tasks"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    bodhi_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bodhi"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    bodhi_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    bodhi_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    bodhi_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = bodhi_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_connections_list_without_backend() {
    bodhi_cmd()
        .args(["connections", "list"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No backend configured"));
}

#[test]
fn test_unknown_profile_is_reported() {
    bodhi_cmd()
        .args(["--profile", "prod", "tasks", "list"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("prod"));
}

#[test]
fn test_invalid_backend_url() {
    bodhi_cmd()
        .args(["--backend", "not a url", "connections", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("backend"));
}

#[test]
fn test_unreachable_backend() {
    bodhi_cmd()
        .args(["--backend", "http://127.0.0.1:1", "--timeout", "5", "tasks", "list"])
        .assert()
        .failure()
        .code(7);
}

#[test]
fn test_remove_requires_yes_without_terminal() {
    bodhi_cmd()
        .args(["--backend", "http://127.0.0.1:1", "connections", "remove", "mysql-1"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_invalid_output_format() {
    let output = bodhi_cmd()
        .args(["--output", "invalid", "connections", "list"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_add_rejects_unknown_type() {
    bodhi_cmd()
        .args([
            "connections",
            "add",
            "--name",
            "docs",
            "--type",
            "mongodb",
        ])
        .assert()
        .failure()
        .code(2);
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_connections_subcommands_exist() {
    bodhi_cmd()
        .args(["connections", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("add"))
                .and(predicate::str::contains("update"))
                .and(predicate::str::contains("remove"))
                .and(predicate::str::contains("test")),
        );
}

#[test]
fn test_tasks_subcommands_exist() {
    bodhi_cmd()
        .args(["tasks", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("create"))
                .and(predicate::str::contains("start"))
                .and(predicate::str::contains("refresh")),
        );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` falls back to defaults when no file exists.
    bodhi_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_path() {
    bodhi_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_set_profile_then_list() {
    let home = tempfile::tempdir().unwrap();
    let home = home.path().to_str().unwrap();

    bodhi_cmd_with_config_home(home)
        .args([
            "config",
            "set-profile",
            "lab",
            "--backend",
            "http://127.0.0.1:1421",
        ])
        .assert()
        .success();

    bodhi_cmd_with_config_home(home)
        .args(["-o", "plain", "config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lab"));

    bodhi_cmd_with_config_home(home)
        .args(["config", "use", "lab"])
        .assert()
        .success();

    bodhi_cmd_with_config_home(home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile = \"lab\""));
}

// ── Against a mocked bridge ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_add_redis_connection_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke/add_redis_connection"))
        .and(body_partial_json(json!({ "url": "redis://localhost:6379", "db": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "data": "redis-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/invoke/save_database_config_to_db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "data": "redis-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        bodhi_cmd()
            .args([
                "--backend",
                uri.as_str(),
                "-o",
                "json-compact",
                "connections",
                "add",
                "--name",
                "cache",
                "--type",
                "redis",
                "--host",
                "localhost",
            ])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    let text = combined_output(&output);
    assert!(output.status.success(), "command failed:\n{text}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""id":"redis-1""#), "stdout:\n{stdout}");
}
