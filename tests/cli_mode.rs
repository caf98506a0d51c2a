use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("index.txt");
    fs::write(
        &path,
        "\
a 1: b 1..5, b 15..20
b 17:
",
    )
    .unwrap();
    path
}

#[test]
fn default_mode_intersects_repeated_ranges_and_is_unsatisfiable() {
    let dir = TempDir::new().unwrap();
    let index = write_fixture(&dir);

    let mut cmd = cargo::cargo_bin_cmd!();
    cmd.args(["-I", index.to_str().unwrap(), "satisfy", "a", "1"]);
    cmd.assert()
        .success()
        .stdout(predicate::eq("This package version can't be satisfied\n"));
}

#[test]
fn union_mode_widens_repeated_ranges_and_is_satisfiable() {
    let dir = TempDir::new().unwrap();
    let index = write_fixture(&dir);

    let mut cmd = cargo::cargo_bin_cmd!();
    cmd.args([
        "-I",
        index.to_str().unwrap(),
        "--mode",
        "union",
        "satisfy",
        "a",
        "1",
        "--oneline",
    ]);
    cmd.assert().success().stdout(predicate::eq("a 1, b 17\n"));
}
