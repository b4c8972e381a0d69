//! End-to-end tests for the `gism list` command.

mod common;
use common::prelude::*;

#[test]
fn test_list_shows_selection_per_platform() {
    let temp = TempDir::new().unwrap();
    write_manifest(&temp, manifests::INCLUDE_ONLY);

    let mut cmd = cargo_bin_cmd!("gism");
    cmd.current_dir(temp.path())
        .args(["--color", "never", "list", "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("include"))
        .stdout(predicate::str::contains("(other platform)"))
        .stdout(predicate::str::contains("1 of 2 entries selected for linux (runtime only)"));
}

#[test]
fn test_list_reports_build_mode_exclusions() {
    let temp = TempDir::new().unwrap();
    write_manifest(&temp, manifests::BUILD_MODES);

    let mut cmd = cargo_bin_cmd!("gism");
    cmd.current_dir(temp.path())
        .args(["--color", "never", "list", "--buildonly", "--platform", "osx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(excluded by build mode)"))
        .stdout(predicate::str::contains("2 of 3 entries selected for osx (build only)"));
}

#[test]
fn test_list_default_mode_excludes_build_only_entries() {
    let temp = TempDir::new().unwrap();
    write_manifest(&temp, manifests::BUILD_MODES);

    let output = cargo_bin_cmd!("gism")
        .current_dir(temp.path())
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let selected: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["selected"] == true)
        .map(|r| r["destination"].as_str().unwrap())
        .collect();
    assert_eq!(selected, ["core", "plugins"]);
}

#[test]
fn test_list_json_output() {
    let temp = TempDir::new().unwrap();
    write_manifest(
        &temp,
        "linux http://svn.example.com/lib/trunk lib 1234\nwin git@example.com:team/sdk.git sdk trunk\n",
    );

    let output = cargo_bin_cmd!("gism")
        .current_dir(temp.path())
        .args(["list", "--json", "--platform", "linux"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["scheme"], "svn");
    assert_eq!(rows[0]["revision"], "1234");
    assert_eq!(rows[0]["selected"], true);
    assert_eq!(rows[1]["scheme"], "git");
    assert_eq!(rows[1]["selected"], false);
    assert_eq!(rows[1]["reason"], "other platform");
}

#[test]
fn test_list_does_not_seed_from_template() {
    let temp = TempDir::new().unwrap();
    temp.child("modules.txt.template")
        .write_str(manifests::INCLUDE_ONLY)
        .unwrap();

    let mut cmd = cargo_bin_cmd!("gism");
    cmd.current_dir(temp.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Manifest not found"));

    temp.child("modules.txt").assert(predicate::path::missing());
}

#[test]
fn test_list_empty_manifest() {
    let temp = TempDir::new().unwrap();
    write_manifest(&temp, "# nothing yet\n\n");

    let mut cmd = cargo_bin_cmd!("gism");
    cmd.current_dir(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries in modules.txt"));
}

#[test]
fn test_list_unsupported_platform_override() {
    let temp = TempDir::new().unwrap();
    write_manifest(&temp, manifests::INCLUDE_ONLY);

    let mut cmd = cargo_bin_cmd!("gism");
    cmd.current_dir(temp.path())
        .args(["list", "--platform", "amiga"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'amiga'"));
}
