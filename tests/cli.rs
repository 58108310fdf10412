use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("wbi-dash").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("wbi-dash"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn show_rejects_reversed_years() {
    let mut cmd = Command::cargo_bin("wbi-dash").unwrap();
    // Unroutable base URL: the year check fails before any request is made.
    cmd.args([
        "--base-url",
        "http://127.0.0.1:9",
        "show",
        "--locations",
        "FRA",
        "--years",
        "2020:2015",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("reversed"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn show_online_france() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("fra.html");
    let mut cmd = Command::cargo_bin("wbi-dash").unwrap();
    cmd.args(["show", "--locations", "FRA", "--years", "2015:2020", "--bar", "--html"])
        .arg(&html);
    cmd.assert().success();
    assert!(html.exists());
}
