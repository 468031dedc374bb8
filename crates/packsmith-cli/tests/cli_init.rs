use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn packsmith_cmd() -> Command {
    Command::cargo_bin("packsmith").unwrap()
}

#[test]
fn test_init_creates_config_and_root() {
    let tmp = TempDir::new().unwrap();

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized Packsmith workspace"));

    let config = std::fs::read_to_string(tmp.path().join("Packsmith.toml")).unwrap();
    let parsed: toml::Value = toml::from_str(&config).unwrap();
    assert_eq!(parsed["resolve"]["lockfile"].as_str(), Some("Packsmith.lock"));
    assert!(tmp.path().join("packs").is_dir());

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .success();
}

#[test]
fn test_init_refuses_existing_workspace() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Packsmith.toml"), "").unwrap();

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
