use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[identity]"));
    assert!(contents.contains("client_id ="));
    assert!(contents.contains("[chat]"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_missing_client_id_is_reported() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("idchat")
        .env("IDCHAT_HOME", dir.path())
        .env_remove("IDCHAT_CLIENT_ID")
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("client_id"));
}
