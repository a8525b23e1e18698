//! Per-run memoization of index responses.
//!
//! Backtracking revisits the same packages repeatedly; one cache per
//! resolution run keeps each `(package)` and `(package, version)` lookup to a
//! single index call. The cache is an explicit context value owned by the
//! resolver, never shared across runs.

use std::collections::{BTreeMap, HashMap};

use verlock_core::version::Version;
use verlock_util::errors::VerlockResult;

use crate::PackageIndex;

pub struct IndexCache<'a> {
    index: &'a dyn PackageIndex,
    versions: HashMap<String, Vec<Version>>,
    dependencies: HashMap<(String, Version), BTreeMap<String, String>>,
}

impl<'a> IndexCache<'a> {
    pub fn new(index: &'a dyn PackageIndex) -> Self {
        Self {
            index,
            versions: HashMap::new(),
            dependencies: HashMap::new(),
        }
    }

    /// Version list for `name`, sorted descending (the order candidate
    /// selection consumes), so sorting happens once per package per run.
    pub fn available_versions(&mut self, name: &str) -> VerlockResult<&[Version]> {
        if !self.versions.contains_key(name) {
            let mut fetched = self.index.available_versions(name)?;
            fetched.sort_by(|a, b| b.cmp(a));
            self.versions.insert(name.to_string(), fetched);
        }
        Ok(&self.versions[name])
    }

    /// Dependency map for `name` at `version`.
    pub fn dependencies_of(
        &mut self,
        name: &str,
        version: &Version,
    ) -> VerlockResult<&BTreeMap<String, String>> {
        let key = (name.to_string(), version.clone());
        if !self.dependencies.contains_key(&key) {
            let fetched = self.index.dependencies_of(name, version)?;
            self.dependencies.insert(key.clone(), fetched);
        }
        Ok(&self.dependencies[&key])
    }
}
