use packsmith_core::lockfile::{LockedDependency, LockedPack, Lockfile};
use tempfile::TempDir;

fn sample() -> Lockfile {
    Lockfile {
        pack: vec![
            LockedPack {
                identifier: "core:base".to_string(),
                version: "1.0.0".to_string(),
                checksum: Some("abc123".to_string()),
                dependency_count: 0,
                dependencies: vec![],
            },
            LockedPack {
                identifier: "mod:a".to_string(),
                version: "1.0.0".to_string(),
                checksum: None,
                dependency_count: 1,
                dependencies: vec![LockedDependency {
                    identifier: "core:base".to_string(),
                    selected: "1.0.0".to_string(),
                    acceptable: vec!["1.0.0".to_string()],
                }],
            },
        ],
    }
}

#[test]
fn serialized_lockfile_parses_back() {
    let lockfile = sample();
    let serialized = lockfile.to_string_pretty().unwrap();
    assert!(serialized.contains("dependency-count = 1"));

    let parsed: Lockfile = toml::from_str(&serialized).unwrap();
    assert_eq!(parsed.pack, lockfile.pack);
}

#[test]
fn write_and_find() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Packsmith.lock");
    sample().write_to(&path).unwrap();

    let loaded = Lockfile::from_path(&path).unwrap();
    let a = loaded.find("mod:a", "1.0.0").unwrap();
    assert_eq!(a.dependencies[0].selected, "1.0.0");
    assert!(loaded.find("mod:a", "2.0.0").is_none());
}

#[test]
fn empty_lockfile() {
    let lockfile = Lockfile::default();
    let parsed: Lockfile = toml::from_str(&lockfile.to_string_pretty().unwrap()).unwrap();
    assert!(parsed.pack.is_empty());
}
