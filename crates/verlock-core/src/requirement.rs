//! Requirements: a constraint on a package, tagged with who imposed it.

use std::fmt;

use crate::constraint::VersionConstraint;
use crate::version::Version;

/// The origin of a requirement, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirer {
    /// A top-level requirement supplied by the caller.
    Root,
    /// Introduced transitively by a chosen package version.
    Package { name: String, version: Version },
}

impl fmt::Display for Requirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "(root)"),
            Self::Package { name, version } => write!(f, "`{name}@{version}`"),
        }
    }
}

/// A single constraint on a package, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub package: String,
    pub constraint: VersionConstraint,
    pub requirer: Requirer,
}

impl Requirement {
    /// A top-level requirement.
    pub fn root(package: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self {
            package: package.into(),
            constraint,
            requirer: Requirer::Root,
        }
    }

    /// A requirement introduced by `by_name@by_version`.
    pub fn from_package(
        package: impl Into<String>,
        constraint: VersionConstraint,
        by_name: impl Into<String>,
        by_version: Version,
    ) -> Self {
        Self {
            package: package.into(),
            constraint,
            requirer: Requirer::Package {
                name: by_name.into(),
                version: by_version,
            },
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` requires `{}`, introduced by {}",
            self.package, self.constraint, self.requirer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirer_display() {
        assert_eq!(Requirer::Root.to_string(), "(root)");
        let from = Requirer::Package {
            name: "app".to_string(),
            version: Version::new(1, 3, 0),
        };
        assert_eq!(from.to_string(), "`app@1.3.0`");
    }

    #[test]
    fn requirement_display() {
        let req = Requirement::root("lib", VersionConstraint::parse("^1.0.0").unwrap());
        assert_eq!(req.to_string(), "`lib` requires `^1.0.0`, introduced by (root)");
    }
}
