//! Tests for the tzparse binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{length_prefixed_block, sample_capture, stored_response, write_capture};

/// tzparse with HOME pointed at an empty directory so no user config is read
fn tzparse(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tzparse").unwrap();
    cmd.env("HOME", home.path()).env_remove("TZPARSE_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    tzparse(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("responses"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn parse_lists_blocks() {
    let home = TempDir::new().unwrap();
    let (_temp, path) = write_capture(&sample_capture());

    tzparse(&home)
        .arg("parse")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "File parsed successfully.\nBlock count: 2\n",
        ))
        .stdout(predicate::str::contains("1: Block Size: "))
        .stdout(predicate::str::contains("Response Count: 2"));
}

#[test]
fn responses_filters_by_block() {
    let home = TempDir::new().unwrap();
    let (_temp, path) = write_capture(&sample_capture());

    tzparse(&home)
        .args(["responses", "--block", "1"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1.1: Type: ping, Compression: ZSTD"))
        .stdout(predicate::str::contains("0.0:").not());
}

#[test]
fn responses_rejects_missing_block() {
    let home = TempDir::new().unwrap();
    let (_temp, path) = write_capture(&sample_capture());

    tzparse(&home)
        .args(["responses", "--block", "9"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Block 9 does not exist"));
}

#[test]
fn stats_prints_summary() {
    let home = TempDir::new().unwrap();
    let (_temp, path) = write_capture(&sample_capture());

    tzparse(&home)
        .arg("stats")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Responses: 5"))
        .stdout(predicate::str::contains("Session duration: 00:01:05"))
        .stdout(predicate::str::contains("ping: 3"));
}

#[test]
fn strict_failure_exits_non_zero_with_location() {
    let home = TempDir::new().unwrap();
    let bytes = length_prefixed_block(&[stored_response("ok", "{}"), stored_response("x", "[")]);
    let (_temp, path) = write_capture(&bytes);

    tzparse(&home)
        .args(["parse", "--framing", "length-prefixed"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("block 0, response 1"));
}

#[test]
fn best_effort_prints_output_then_failures() {
    let home = TempDir::new().unwrap();
    let bytes = length_prefixed_block(&[stored_response("ok", "{}"), stored_response("x", "[")]);
    let (_temp, path) = write_capture(&bytes);

    tzparse(&home)
        .args(["responses", "--framing", "length-prefixed", "--best-effort"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("0.0: Type: ok"))
        .stderr(predicate::str::contains("1 failure(s):"))
        .stderr(predicate::str::contains("block 0, response 1"));
}

#[test]
fn export_writes_into_out_directory() {
    let home = TempDir::new().unwrap();
    let (temp, path) = write_capture(&sample_capture());
    let out = temp.path().join("out");

    tzparse(&home)
        .arg("export")
        .arg(&path)
        .arg("--out")
        .arg(&out)
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 5 response(s)"));
    assert!(out.join("0001_000_bye.json").exists());
}

#[test]
fn config_init_then_show() {
    let home = TempDir::new().unwrap();

    tzparse(&home).args(["config", "init"]).assert().success();
    assert!(home.path().join(".config/tzparse/config.toml").exists());

    tzparse(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    tzparse(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[decode]"))
        .stdout(predicate::str::contains("framing = \"delimited\""));
}

#[test]
fn completions_generate_for_bash() {
    let home = TempDir::new().unwrap();
    tzparse(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tzparse"));
}

#[test]
fn best_effort_listing_uses_failure_numbering() {
    let home = TempDir::new().unwrap();
    let bytes = length_prefixed_block(&[
        stored_response("a", "{}"),
        stored_response("bad", "{oops"),
        stored_response("c", "{}"),
    ]);
    let (_temp, path) = write_capture(&bytes);

    tzparse(&home)
        .args(["responses", "--framing", "length-prefixed", "--best-effort"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("0.0: Type: a"))
        .stdout(predicate::str::contains("0.2: Type: c"))
        .stdout(predicate::str::contains("0.1:").not())
        .stderr(predicate::str::contains("block 0, response 1"));
}
