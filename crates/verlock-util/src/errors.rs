use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all verlock operations.
///
/// Unsatisfiable version constraints are not represented here: the resolver
/// reports them through its `Conflict` result, which carries the full
/// requirer trail.
#[derive(Debug, Error, Diagnostic)]
pub enum VerlockError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed version or constraint expression.
    #[error("Invalid version or constraint: {message}")]
    #[diagnostic(help("Supported forms: ==1.2.3, >=1.2, <2, !=1.0.0, ^1.2.3, ~1.2.3, *, 1.*, 1.2.*"))]
    Parse { message: String },

    /// The index has no package with this name.
    #[error("Package `{name}` not found in the index")]
    PackageNotFound { name: String },

    /// The index knows the package but not this version of it.
    #[error("Package `{name}` has no version {version} in the index")]
    VersionNotFound { name: String, version: String },

    /// Lock file text does not match the expected schema.
    #[error("Malformed lock file: {message}")]
    #[diagnostic(help("Regenerate the lock file from the current requirements"))]
    MalformedLockFile { message: String },

    /// Lock file was written by an incompatible format revision.
    #[error("Unsupported lock file version {found} (this build reads version {expected})")]
    UnsupportedLockVersion { found: u32, expected: u32 },

    /// Safety fuse for pathological inputs: the resolver gave up after too
    /// many expansion steps.
    #[error("Resolution exceeded {steps} expansion steps")]
    #[diagnostic(help("Raise ResolverConfig::max_steps if the dependency graph is legitimately this large"))]
    MaxDepthExceeded { steps: usize },

    /// Resolution was cancelled from outside between expansion steps.
    #[error("Resolution cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the workspace.
pub type VerlockResult<T> = Result<T, VerlockError>;
