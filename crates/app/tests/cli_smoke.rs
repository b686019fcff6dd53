//! End-to-end checks of the `envshield` binary.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn envshield() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("envshield");
    cmd.env_remove("ENVSHIELD_VARIABLES")
        .env_remove("ENVSHIELD_MAX_ITERATIONS")
        .env_remove("RUST_LOG");
    cmd
}

fn write_vars(tmp: &TempDir, json: &str) -> PathBuf {
    let path = tmp.path().join("vars.json");
    fs::write(&path, json).expect("write vars");
    path
}

#[test]
fn help_works() {
    envshield()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn resolve_prints_lines_in_input_order() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(
        &tmp,
        r#"{"URL": "http://${HOST}:${PORT}", "HOST": "localhost", "PORT": "8080"}"#,
    );

    envshield()
        .args(["resolve", "--file"])
        .arg(&vars)
        .assert()
        .success()
        .stdout("URL=http://localhost:8080\nHOST=localhost\nPORT=8080\n");
}

#[test]
fn resolve_json_reports_missing_references() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"A": "${GHOST}"}"#);

    let output = envshield()
        .args(["resolve", "--format", "json", "--file"])
        .arg(&vars)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(value["resolved"]["A"], "${GHOST}");
    assert_eq!(value["errors"][0]["type"], "missing");
    assert_eq!(value["errors"][0]["variable"], "A");
}

#[test]
fn resolve_reads_stdin_and_env_configuration() {
    envshield()
        .env("ENVSHIELD_VARIABLES", "-")
        .arg("resolve")
        .write_stdin(
            r#"{"variables": [{"key": "A", "value": "1"}, {"key": "B", "value": "${A}2"}]}"#,
        )
        .assert()
        .success()
        .stdout("A=1\nB=12\n");
}

#[test]
fn resolve_with_cycle_prints_no_values() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"A": "${B}", "B": "${A}"}"#);

    envshield()
        .args(["resolve", "--file"])
        .arg(&vars)
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("Circular dependency: A -> B -> A"))
        .stderr(predicate::str::contains("Resolution aborted due to circular dependencies"));
}

#[test]
fn check_reports_without_values() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"bad-key": "s3cr3t", "URL": "${GHOST}/s3cr3t"}"#);

    envshield()
        .args(["check", "--file"])
        .arg(&vars)
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid bad-key"))
        .stdout(predicate::str::contains("missing URL: References undefined variable: GHOST"))
        .stdout(predicate::str::contains("2 variable(s), 2 error(s), 1 warning(s)"))
        .stdout(predicate::str::contains("s3cr3t").not());
}

#[test]
fn check_passes_clean_environment() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"A": "1", "B": "${A}"}"#);

    envshield()
        .args(["check", "--file"])
        .arg(&vars)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 error(s)"));
}

#[test]
fn missing_file_fails() {
    envshield()
        .args(["resolve", "--file", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load variables"));
}

#[cfg(unix)]
#[test]
fn run_injects_resolved_variables() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"URL": "http://${HOST}", "HOST": "localhost"}"#);

    envshield()
        .args(["run", "--resolve", "--file"])
        .arg(&vars)
        .args(["--", "sh", "-c", r#"test "$URL" = http://localhost"#])
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn run_without_resolve_injects_raw_values() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"URL": "http://${HOST}", "HOST": "localhost"}"#);

    envshield()
        .args(["run", "--file"])
        .arg(&vars)
        .args(["--", "sh", "-c", r#"test "$URL" = 'http://${HOST}'"#])
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn run_propagates_exit_code() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"A": "1"}"#);

    envshield()
        .args(["run", "--file"])
        .arg(&vars)
        .args(["--", "sh", "-c", "exit 3"])
        .assert()
        .code(3);
}

#[cfg(unix)]
#[test]
fn run_refuses_cyclic_environment() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"A": "${A}"}"#);

    envshield()
        .args(["run", "--resolve", "--file"])
        .arg(&vars)
        .args(["--", "sh", "-c", "exit 0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("circular dependencies in: A"));
}

#[cfg(unix)]
#[test]
fn run_refuses_keys_that_are_not_variable_names() {
    let tmp = TempDir::new().unwrap();
    let vars = write_vars(&tmp, r#"{"GOOD": "1", "bad-key": "2"}"#);

    envshield()
        .args(["run", "--file"])
        .arg(&vars)
        .args(["--", "sh", "-c", "exit 0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid variable name: bad-key"));
}
