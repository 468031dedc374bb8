use packsmith_util::hash::manifest_checksum;

#[test]
fn test_checksum_empty_manifest() {
    assert_eq!(
        manifest_checksum(""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_checksum_is_lowercase_hex() {
    let sum = manifest_checksum("[pack]\nidentifier = \"core:base\"\nversion = \"1.0\"\n");
    assert_eq!(sum.len(), 64);
    assert!(sum.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn test_checksum_changes_with_content() {
    let a = manifest_checksum("[pack]\nversion = \"1.0\"\n");
    let b = manifest_checksum("[pack]\nversion = \"1.1\"\n");
    assert_ne!(a, b);
    assert_eq!(a, manifest_checksum("[pack]\nversion = \"1.0\"\n"));
}
