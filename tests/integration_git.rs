//! Integration tests that drive a real `git` binary against local
//! repositories.
//!
//! Run with `cargo test --features integration-tests`.

use std::path::Path;
use std::process::Command;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=gism", "-c", "user.email=gism@example.com"])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// Create `upstream.git`, a bare repository with one commit and a `v1` tag.
fn bare_repo(temp: &TempDir) -> String {
    let work = temp.child("work");
    work.create_dir_all().unwrap();
    git(work.path(), &["init", "-q"]);
    work.child("README.md").write_str("first\n").unwrap();
    git(work.path(), &["add", "README.md"]);
    git(work.path(), &["commit", "-q", "-m", "first"]);
    git(work.path(), &["tag", "v1"]);
    git(temp.path(), &["clone", "-q", "--bare", "work", "upstream.git"]);
    format!("file://{}", temp.child("upstream.git").path().display())
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_git_clone_then_update() {
    let temp = TempDir::new().unwrap();
    let url = bare_repo(&temp);
    let checkout = temp.child("checkout");
    checkout.create_dir_all().unwrap();
    checkout
        .child("modules.txt")
        .write_str(&format!("all {url} lib trunk\n"))
        .unwrap();

    cargo_bin_cmd!("gism")
        .current_dir(checkout.path())
        .args(["--color", "never", "update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 processed"));
    checkout
        .child("lib/README.md")
        .assert(predicate::str::contains("first"));

    // New upstream commit is picked up by the second run
    let work = temp.child("work");
    work.child("README.md").write_str("second\n").unwrap();
    git(work.path(), &["commit", "-q", "-am", "second"]);
    git(work.path(), &["push", "-q", "../upstream.git", "HEAD"]);

    cargo_bin_cmd!("gism")
        .current_dir(checkout.path())
        .args(["--color", "never", "update"])
        .assert()
        .success();
    checkout
        .child("lib/README.md")
        .assert(predicate::str::contains("second"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_git_clone_pinned_tag() {
    let temp = TempDir::new().unwrap();
    let url = bare_repo(&temp);
    temp.child("modules.txt")
        .write_str(&format!("all {url} pinned v1\n"))
        .unwrap();

    cargo_bin_cmd!("gism")
        .current_dir(temp.path())
        .arg("update")
        .assert()
        .success();

    temp.child("pinned/.git").assert(predicate::path::exists());
}
