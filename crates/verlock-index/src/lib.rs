//! The package index capability consumed by the resolver.
//!
//! An index answers two questions: which versions of a package exist, and
//! what a given version depends on. How the answers are obtained (registry
//! HTTP, a vendored snapshot, a test fixture) is the implementation's
//! concern; retry and backoff live there too, never in the resolver.

use std::collections::BTreeMap;

use verlock_core::version::Version;
use verlock_util::errors::{VerlockError, VerlockResult};

pub mod cache;

/// Read-only package metadata source.
///
/// Implementations may block (e.g. on network I/O); the resolver treats each
/// call as a synchronous boundary and memoizes responses per run through
/// [`cache::IndexCache`].
pub trait PackageIndex {
    /// All published versions of `name`, in no particular order.
    fn available_versions(&self, name: &str) -> VerlockResult<Vec<Version>>;

    /// Direct dependencies of `name` at `version`, as
    /// package name -> constraint expression.
    fn dependencies_of(
        &self,
        name: &str,
        version: &Version,
    ) -> VerlockResult<BTreeMap<String, String>>;
}

/// An index held entirely in memory. Used as the test fixture throughout the
/// workspace and suitable for embedding a pre-fetched metadata snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    packages: BTreeMap<String, BTreeMap<Version, BTreeMap<String, String>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package version with its dependency map.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        version: Version,
        dependencies: BTreeMap<String, String>,
    ) {
        self.packages
            .entry(name.into())
            .or_default()
            .insert(version, dependencies);
    }

    /// Convenience form over string literals: `add("app", "1.1.0",
    /// &[("lib", "^2.0")])`.
    pub fn add(&mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> VerlockResult<()> {
        let version = Version::parse(version)?;
        let dependencies = deps
            .iter()
            .map(|(n, c)| (n.to_string(), c.to_string()))
            .collect();
        self.insert(name, version, dependencies);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageIndex for InMemoryIndex {
    fn available_versions(&self, name: &str) -> VerlockResult<Vec<Version>> {
        let versions = self
            .packages
            .get(name)
            .ok_or_else(|| VerlockError::PackageNotFound {
                name: name.to_string(),
            })?;
        Ok(versions.keys().cloned().collect())
    }

    fn dependencies_of(
        &self,
        name: &str,
        version: &Version,
    ) -> VerlockResult<BTreeMap<String, String>> {
        let versions = self
            .packages
            .get(name)
            .ok_or_else(|| VerlockError::PackageNotFound {
                name: name.to_string(),
            })?;
        versions
            .get(version)
            .cloned()
            .ok_or_else(|| VerlockError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn versions_for_known_package() {
        let mut index = InMemoryIndex::new();
        index.add("lib", "1.0.0", &[]).unwrap();
        index.add("lib", "2.0.0", &[("dep", "^1.0")]).unwrap();

        let versions = index.available_versions("lib").unwrap();
        assert_eq!(versions, vec![v("1.0.0"), v("2.0.0")]);
    }

    #[test]
    fn unknown_package_errors() {
        let index = InMemoryIndex::new();
        assert!(matches!(
            index.available_versions("ghost"),
            Err(VerlockError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn dependencies_for_known_version() {
        let mut index = InMemoryIndex::new();
        index.add("lib", "2.0.0", &[("dep", "^1.0")]).unwrap();

        let deps = index.dependencies_of("lib", &v("2.0.0")).unwrap();
        assert_eq!(deps.get("dep").map(String::as_str), Some("^1.0"));
    }

    #[test]
    fn unknown_version_errors() {
        let mut index = InMemoryIndex::new();
        index.add("lib", "1.0.0", &[]).unwrap();
        assert!(matches!(
            index.dependencies_of("lib", &v("9.9.9")),
            Err(VerlockError::VersionNotFound { .. })
        ));
    }
}
