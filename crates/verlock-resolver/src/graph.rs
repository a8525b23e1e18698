//! Working dependency graph mutated in place during a resolution run.
//!
//! Each node accumulates the constraints imposed on a package and the
//! tentatively chosen version. The graph supports exact checkpoint and
//! rollback, which is what makes chronological backtracking possible.

use std::collections::{BTreeMap, BTreeSet};

use verlock_core::constraint::VersionConstraint;
use verlock_core::requirement::{Requirement, Requirer};
use verlock_core::version::Version;

/// Per-package state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphNode {
    /// Tentatively chosen version, `None` until first visited.
    pub resolved_version: Option<Version>,
    /// Every requirement recorded against the package, in arrival order.
    pub constraints: Vec<Requirement>,
    /// Names of packages that currently require this one.
    pub dependents: BTreeSet<String>,
    /// Set when a later constraint invalidated `resolved_version`; the node
    /// must be re-resolved before the graph is stable again.
    pub dirty: bool,
}

impl GraphNode {
    /// Conjunction of every constraint on the node.
    pub fn intersected(&self) -> VersionConstraint {
        self.constraints
            .iter()
            .fold(VersionConstraint::any(), |acc, req| {
                acc.intersect(&req.constraint)
            })
    }

    pub fn satisfies_all(&self, version: &Version) -> bool {
        self.constraints
            .iter()
            .all(|req| req.constraint.matches(version))
    }
}

/// The resolver's working state: one node per package name.
///
/// Created fresh per resolution run and owned exclusively by it; the run is
/// strictly sequential, so no internal locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, GraphNode>,
}

/// Exact checkpoint of the full node map.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    nodes: BTreeMap<String, GraphNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    fn node_mut(&mut self, name: &str) -> &mut GraphNode {
        self.nodes.entry(name.to_string()).or_default()
    }

    /// Record a requirement against its target package.
    ///
    /// If the target already has a resolved version that the grown constraint
    /// set no longer accepts, the node is marked dirty instead of being left
    /// silently inconsistent.
    pub fn add_requirement(&mut self, req: Requirement) {
        if let Requirer::Package { name, .. } = &req.requirer {
            let dependent = name.clone();
            self.node_mut(&req.package).dependents.insert(dependent);
        }
        let node = self.node_mut(&req.package);
        node.constraints.push(req);
        if let Some(version) = node.resolved_version.clone() {
            if !node.satisfies_all(&version) {
                node.dirty = true;
            }
        }
    }

    /// Assign a version. The caller has already verified it satisfies every
    /// constraint currently on the node.
    pub fn set_resolved(&mut self, name: &str, version: Version) {
        let node = self.node_mut(name);
        node.resolved_version = Some(version);
        node.dirty = false;
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &GraphSnapshot) {
        self.nodes = snapshot.nodes.clone();
    }

    pub fn packages(&self) -> impl Iterator<Item = (&String, &GraphNode)> {
        self.nodes.iter()
    }

    /// Final `package -> version` assignment for all resolved nodes.
    pub fn assignments(&self) -> BTreeMap<String, Version> {
        self.nodes
            .iter()
            .filter_map(|(name, node)| {
                node.resolved_version
                    .as_ref()
                    .map(|v| (name.clone(), v.clone()))
            })
            .collect()
    }

    /// Direct dependencies of `name`, derived from the reverse edges: every
    /// resolved package that lists `name` as a dependent.
    pub fn dependencies_of(&self, name: &str) -> BTreeMap<String, Version> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.dependents.contains(name))
            .filter_map(|(dep, node)| {
                node.resolved_version
                    .as_ref()
                    .map(|v| (dep.clone(), v.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use verlock_core::requirement::Requirement;

    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn req(package: &str, constraint: &str) -> Requirement {
        Requirement::root(package, VersionConstraint::parse(constraint).unwrap())
    }

    #[test]
    fn requirement_accumulates_on_node() {
        let mut graph = DependencyGraph::new();
        graph.add_requirement(req("lib", "^1.0.0"));
        graph.add_requirement(req("lib", ">=1.2.0"));

        let node = graph.node("lib").unwrap();
        assert_eq!(node.constraints.len(), 2);
        assert!(node.intersected().matches(&v("1.2.0")));
        assert!(!node.intersected().matches(&v("1.1.0")));
    }

    #[test]
    fn dependents_track_requirers() {
        let mut graph = DependencyGraph::new();
        graph.add_requirement(Requirement::from_package(
            "lib",
            VersionConstraint::parse("^1.0.0").unwrap(),
            "app",
            v("1.0.0"),
        ));
        assert!(graph.node("lib").unwrap().dependents.contains("app"));
    }

    #[test]
    fn violating_constraint_marks_dirty() {
        let mut graph = DependencyGraph::new();
        graph.add_requirement(req("lib", "^1.0.0"));
        graph.set_resolved("lib", v("1.5.0"));
        assert!(!graph.node("lib").unwrap().dirty);

        graph.add_requirement(req("lib", ">=1.9.0"));
        assert!(graph.node("lib").unwrap().dirty);
    }

    #[test]
    fn compatible_constraint_keeps_node_clean() {
        let mut graph = DependencyGraph::new();
        graph.add_requirement(req("lib", "^1.0.0"));
        graph.set_resolved("lib", v("1.5.0"));
        graph.add_requirement(req("lib", ">=1.2.0"));
        assert!(!graph.node("lib").unwrap().dirty);
    }

    #[test]
    fn snapshot_restore_is_exact() {
        let mut graph = DependencyGraph::new();
        graph.add_requirement(req("lib", "^1.0.0"));
        graph.set_resolved("lib", v("1.5.0"));
        let checkpoint = graph.snapshot();

        graph.add_requirement(req("lib", ">=1.9.0"));
        graph.add_requirement(req("other", "*"));
        graph.set_resolved("other", v("0.1.0"));

        graph.restore(&checkpoint);
        assert!(graph.node("other").is_none());
        let node = graph.node("lib").unwrap();
        assert_eq!(node.constraints.len(), 1);
        assert!(!node.dirty);
        assert_eq!(node.resolved_version, Some(v("1.5.0")));
    }

    #[test]
    fn dependencies_derived_from_reverse_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_requirement(req("app", "*"));
        graph.set_resolved("app", v("1.0.0"));
        graph.add_requirement(Requirement::from_package(
            "lib",
            VersionConstraint::parse("^2.0.0").unwrap(),
            "app",
            v("1.0.0"),
        ));
        graph.set_resolved("lib", v("2.1.0"));

        let deps = graph.dependencies_of("app");
        assert_eq!(deps.get("lib"), Some(&v("2.1.0")));
        assert!(graph.dependencies_of("lib").is_empty());
    }
}
