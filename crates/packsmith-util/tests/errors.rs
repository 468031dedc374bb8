use packsmith_util::errors::PacksmithError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = PacksmithError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_manifest_error_display() {
    let err = PacksmithError::Manifest {
        message: "bad identifier".to_string(),
    };
    assert_eq!(err.to_string(), "Manifest error: bad identifier");
}

#[test]
fn test_config_error_display() {
    let err = PacksmithError::Config {
        message: "unknown key".to_string(),
    };
    assert_eq!(err.to_string(), "Config error: unknown key");
}

#[test]
fn test_resolution_error_display() {
    let err = PacksmithError::Resolution {
        message: "2 packs discarded".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Dependency resolution failed: 2 packs discarded"
    );
}

#[test]
fn test_compilation_error_display() {
    let err = PacksmithError::Compilation {
        message: "bad asset".to_string(),
    };
    assert_eq!(err.to_string(), "Compilation failed: bad asset");
}

#[test]
fn test_generic_error_display() {
    let err = PacksmithError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_error_converts_into_miette_report() {
    let err = PacksmithError::Manifest {
        message: "oops".to_string(),
    };
    let report: miette::Report = err.into();
    assert!(report.to_string().contains("oops"));
}
