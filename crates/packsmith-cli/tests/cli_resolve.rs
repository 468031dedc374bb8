use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use packsmith_core::lockfile::Lockfile;

fn packsmith_cmd() -> Command {
    Command::cargo_bin("packsmith").unwrap()
}

fn write_pack(workspace: &Path, dir: &str, manifest: &str) {
    let pack_dir = workspace.join("packs").join(dir);
    fs::create_dir_all(&pack_dir).unwrap();
    fs::write(pack_dir.join("pack.toml"), manifest).unwrap();
}

fn workspace(config: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Packsmith.toml"), config).unwrap();
    write_pack(
        tmp.path(),
        "base",
        r#"
[pack]
identifier = "core:base"
version = "1.0.0"
"#,
    );
    write_pack(
        tmp.path(),
        "mod-a",
        r#"
[pack]
identifier = "mod:a"
version = "1.0"

[[dependencies]]
identifier = "core:base"
version = "[1.0,2.0)"
"#,
    );
    tmp
}

#[test]
fn test_resolve_writes_lockfile_in_compile_order() {
    let tmp = workspace("");

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Locked"));

    let lockfile = Lockfile::from_path(&tmp.path().join("Packsmith.lock")).unwrap();
    let order: Vec<&str> = lockfile.pack.iter().map(|p| p.identifier.as_str()).collect();
    assert_eq!(order, vec!["core:base", "mod:a"]);

    let a = lockfile.find("mod:a", "1.0.0").unwrap();
    assert_eq!(a.dependency_count, 1);
    assert_eq!(a.dependencies[0].identifier, "core:base");
    assert_eq!(a.dependencies[0].selected, "1.0.0");
    assert!(a.checksum.is_some());
}

#[test]
fn test_resolve_json_reports_discarded_packs() {
    let tmp = workspace("");
    write_pack(
        tmp.path(),
        "mod-b",
        r#"
[pack]
identifier = "mod:b"
version = "1.0.0"

[[dependencies]]
identifier = "core:missing"
"#,
    );

    let output = packsmith_cmd()
        .current_dir(tmp.path())
        .args(["resolve", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["compiled"], serde_json::json!(["core:base@1.0.0", "mod:a@1.0.0"]));
    let discarded = outcome["discarded"].as_array().unwrap();
    assert_eq!(discarded.len(), 1);
    assert_eq!(discarded[0]["identifier"], "mod:b@1.0.0");
    assert_eq!(discarded[0]["reason"], "missing-dependency");
}

#[test]
fn test_resolve_fail_on_error() {
    let tmp = workspace("[resolve]\nfail-on-error = true\n");
    write_pack(
        tmp.path(),
        "mod-c",
        r#"
[pack]
identifier = "mod:c"
version = "1.0.0"

[[dependencies]]
identifier = "mod:c"
"#,
    );

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 pack(s) discarded"));

    // Survivors are still locked.
    let lockfile = Lockfile::from_path(&tmp.path().join("Packsmith.lock")).unwrap();
    assert_eq!(lockfile.pack.len(), 2);
}

#[test]
fn test_resolve_skips_broken_manifest() {
    let tmp = workspace("");
    write_pack(tmp.path(), "broken", "[pack]\nidentifier = \"no-namespace\"\nversion = \"1.0\"\n");

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped"));

    let lockfile = Lockfile::from_path(&tmp.path().join("Packsmith.lock")).unwrap();
    assert_eq!(lockfile.pack.len(), 2);
}

#[test]
fn test_resolve_custom_roots_and_lockfile() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("Packsmith.toml"),
        "[workspace]\nroots = [\"vanilla\"]\n\n[resolve]\nlockfile = \"out/packs.lock\"\n",
    )
    .unwrap();
    let pack_dir = tmp.path().join("vanilla").join("base");
    fs::create_dir_all(&pack_dir).unwrap();
    fs::write(
        pack_dir.join("pack.toml"),
        "[pack]\nidentifier = \"core:base\"\nversion = \"2\"\n",
    )
    .unwrap();

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .success();

    let lockfile = Lockfile::from_path(&tmp.path().join("out/packs.lock")).unwrap();
    assert_eq!(lockfile.pack[0].version, "2.0.0");
}

#[test]
fn test_resolve_with_manifest_path() {
    let tmp = workspace("");
    let elsewhere = TempDir::new().unwrap();
    let manifest = tmp.path().join("Packsmith.toml");

    packsmith_cmd()
        .current_dir(elsewhere.path())
        .args(["resolve", "--manifest-path"])
        .arg(&manifest)
        .assert()
        .success();

    assert!(tmp.path().join("Packsmith.lock").is_file());
}

#[test]
fn test_resolve_missing_manifest_path() {
    let tmp = TempDir::new().unwrap();

    packsmith_cmd()
        .current_dir(tmp.path())
        .args(["resolve", "--manifest-path", "nope/Packsmith.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
