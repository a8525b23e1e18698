use verlock_util::errors::VerlockError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = VerlockError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_parse_error_display() {
    let err = VerlockError::Parse {
        message: "empty constraint".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Invalid version or constraint: empty constraint"
    );
}

#[test]
fn test_package_not_found_display() {
    let err = VerlockError::PackageNotFound {
        name: "leftpad".to_string(),
    };
    assert_eq!(err.to_string(), "Package `leftpad` not found in the index");
}

#[test]
fn test_version_not_found_display() {
    let err = VerlockError::VersionNotFound {
        name: "leftpad".to_string(),
        version: "1.0.0".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Package `leftpad` has no version 1.0.0 in the index"
    );
}

#[test]
fn test_unsupported_lock_version_display() {
    let err = VerlockError::UnsupportedLockVersion {
        found: 7,
        expected: 1,
    };
    assert_eq!(
        err.to_string(),
        "Unsupported lock file version 7 (this build reads version 1)"
    );
}

#[test]
fn test_max_depth_display() {
    let err = VerlockError::MaxDepthExceeded { steps: 10_000 };
    assert_eq!(err.to_string(), "Resolution exceeded 10000 expansion steps");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: VerlockError = io_err.into();
    matches!(err, VerlockError::Io(_));
}
