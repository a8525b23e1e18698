//! Conflict explanation: why no version of a package can be chosen.

use std::fmt;

use verlock_core::requirement::Requirement;
use verlock_core::version::Version;

use crate::graph::DependencyGraph;

/// Explanation of an unsatisfiable package, suitable for user-facing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictReport {
    /// The package no candidate version satisfies.
    pub package: String,
    /// Every constraint recorded against it, in arrival order.
    pub constraints: Vec<Requirement>,
    /// Minimal conflicting subset: two requirers whose ranges are provably
    /// disjoint. Falls back to the full list when emptiness only arises from
    /// the combination (or from an exhausted candidate list).
    pub conflicting: Vec<Requirement>,
    /// Versions chosen on the way here, oldest decision first.
    pub trail: Vec<(String, Version)>,
}

/// Build the report for `package` from the current graph state.
pub fn explain(
    graph: &DependencyGraph,
    package: &str,
    trail: &[(String, Version)],
) -> ConflictReport {
    let constraints = graph
        .node(package)
        .map(|node| node.constraints.clone())
        .unwrap_or_default();
    let conflicting = minimal_conflict(&constraints);
    ConflictReport {
        package: package.to_string(),
        constraints,
        conflicting,
        trail: trail.to_vec(),
    }
}

/// Validate a finished graph: every node with constraints must hold a version
/// satisfying all of them. Returns the first offender's report.
pub fn validate(graph: &DependencyGraph, trail: &[(String, Version)]) -> Option<ConflictReport> {
    for (name, node) in graph.packages() {
        let stable = match &node.resolved_version {
            Some(version) => !node.dirty && node.satisfies_all(version),
            None => node.constraints.is_empty(),
        };
        if !stable {
            return Some(explain(graph, name, trail));
        }
    }
    None
}

/// First pair of requirements with provably disjoint ranges, else the whole
/// set.
fn minimal_conflict(constraints: &[Requirement]) -> Vec<Requirement> {
    for (i, a) in constraints.iter().enumerate() {
        for b in &constraints[i + 1..] {
            if a.constraint.disjoint(&b.constraint) {
                return vec![a.clone(), b.clone()];
            }
        }
    }
    constraints.to_vec()
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "No version of `{}` satisfies all constraints:", self.package)?;
        for req in &self.conflicting {
            writeln!(f, "  {req}")?;
        }
        if !self.trail.is_empty() {
            write!(f, "  decision trail:")?;
            for (name, version) in &self.trail {
                write!(f, " {name}@{version}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
