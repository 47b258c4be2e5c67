//! Binary-level behavior of the command-line interface.

mod support;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use dutchbook::domain::Direction;
use dutchbook::testkit::config::toml;
use predicates::prelude::*;

use support::relation::{book, equivalence, general, ordering, store_in};

fn dutchbook(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dutchbook").unwrap();
    cmd.current_dir(dir).env_remove("MANIFOLD_API_KEY");
    cmd
}

fn write_config(dir: &Path, content: &str) {
    fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn check_config_accepts_valid_setup() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(
        dir.path(),
        &book(vec![equivalence(&["a", "b"]), ordering(&["c", "d"])]),
    );
    write_config(dir.path(), &toml(store.path()));

    dutchbook(dir.path())
        .args(["check", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("2 relationships are valid"))
        .stdout(predicate::str::contains("MANIFOLD_API_KEY is not set"));
}

#[test]
fn check_config_rejects_bad_bucket() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "[rate_limit.write]\ncapacity = 0\ndrain_rate = 1.0\n");

    dutchbook(dir.path())
        .args(["check", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rate_limit.write"));
}

#[test]
fn check_config_rejects_oversized_relationship() {
    let dir = tempfile::tempdir().unwrap();
    let directions = ["a", "b", "c", "d", "e"].into_iter().map(Direction::yes).collect();
    let store = store_in(dir.path(), &book(vec![general(directions, 0.95)]));
    write_config(dir.path(), &toml(store.path()));

    dutchbook(dir.path())
        .args(["check", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid relationship #0"));
}

#[test]
fn relations_list_prints_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(
        dir.path(),
        &book(vec![
            equivalence(&["a", "b"]),
            general(vec![Direction::no("c")], 0.9),
        ]),
    );

    dutchbook(dir.path())
        .arg("relations")
        .arg("list")
        .arg("--relations")
        .arg(store.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("equivalence"))
        .stdout(predicate::str::contains("general"))
        .stdout(predicate::str::contains("NO c"));
}

#[test]
fn relations_list_without_document_suggests_add() {
    let dir = tempfile::tempdir().unwrap();

    dutchbook(dir.path())
        .args(["relations", "list", "--relations", "none.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No relationships declared"));
}

#[test]
fn run_requires_config_file() {
    let dir = tempfile::tempdir().unwrap();

    dutchbook(dir.path())
        .args(["run", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn run_requires_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path(), &book(vec![equivalence(&["a", "b"])]));
    write_config(dir.path(), &toml(store.path()));

    dutchbook(dir.path())
        .args(["run", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MANIFOLD_API_KEY is not set"));
}
