//! Integration tests for `status` and `logout` against a seeded token cache.


use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{seed_signed_in, temp_home, write_config};
use predicates::prelude::*;

#[test]
fn test_status_not_signed_in() {
    let home = temp_home();
    write_config(home.path(), "http://127.0.0.1:9/unused");

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));
}

#[test]
fn test_status_shows_cached_account() {
    let home = temp_home();
    write_config(home.path(), "http://127.0.0.1:9/unused");
    seed_signed_in(home.path());

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as Ada Lovelace (ada@example.com)"));
}

#[test]
fn test_logout_without_account() {
    let home = temp_home();
    write_config(home.path(), "http://127.0.0.1:9/unused");

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));

    assert!(!home.path().join("token_cache.json").exists());
}

#[test]
fn test_logs_are_written_under_home() {
    let home = temp_home();
    write_config(home.path(), "http://127.0.0.1:9/unused");

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", home.path())
        .arg("status")
        .assert()
        .success();

    let logs = fs::read_dir(home.path().join("logs")).unwrap().count();
    assert!(logs > 0);
}
