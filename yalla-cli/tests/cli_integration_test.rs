//! End-to-end tests for the `yalla` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("yalla").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("embeddable terminal REPL framework"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("yalla").unwrap();
    cmd.arg("--version").assert().success().stdout(predicate::str::contains("yalla"));
}

#[test]
fn test_repl_subcommand_help() {
    let mut cmd = Command::cargo_bin("yalla").unwrap();
    cmd.arg("repl")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bootstrap"));
}

#[test]
#[serial]
fn test_repl_runs_bootstrap_then_exits_on_eof() {
    let dir = tempdir().unwrap();
    let bootstrap_path = dir.path().join("bootstrap.yalla");
    fs::write(&bootstrap_path, "1 + 1\n").unwrap();

    let mut cmd = Command::cargo_bin("yalla").unwrap();
    cmd.arg("repl")
        .arg("--bootstrap")
        .arg(&bootstrap_path)
        .arg("--no-history")
        .arg("--no-colors")
        .arg("--quiet")
        .write_stdin("")
        .assert()
        .success();
}

#[test]
#[serial]
fn test_repl_exits_non_zero_when_bootstrap_fails() {
    let dir = tempdir().unwrap();
    let bootstrap_path = dir.path().join("broken.yalla");
    fs::write(&bootstrap_path, "$undefined_var + 1\n").unwrap();

    let mut cmd = Command::cargo_bin("yalla").unwrap();
    cmd.arg("repl")
        .arg("--bootstrap")
        .arg(&bootstrap_path)
        .arg("--no-history")
        .arg("--no-colors")
        .arg("--quiet")
        .write_stdin("")
        .assert()
        .failure();
}

#[test]
#[serial]
fn test_repl_missing_bootstrap_file_fails() {
    let mut cmd = Command::cargo_bin("yalla").unwrap();
    cmd.arg("repl")
        .arg("--bootstrap")
        .arg("/nonexistent/path/does-not-exist.yalla")
        .arg("--no-history")
        .arg("--quiet")
        .write_stdin("")
        .assert()
        .failure();
}
