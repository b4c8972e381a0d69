//! End-to-end tests for the `gism completions` command.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("gism");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("powershell"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("gism");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_gism()"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("gism");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef gism"))
        .stdout(predicate::str::contains("--buildonly"));
}

#[test]
fn test_completions_fish() {
    let mut cmd = cargo_bin_cmd!("gism");
    cmd.arg("completions")
        .arg("fish")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete -c gism"));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("gism");
    cmd.arg("completions")
        .arg("invalid-shell")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
