//! Core resolution algorithm: a requirement queue expanded depth-first with
//! chronological backtracking.
//!
//! Determinism contract: top-level requirements are processed in the order
//! supplied, dependency maps iterate in name order, and candidate selection
//! always prefers the highest version. Identical inputs give identical
//! results, including the conflict trail on failure.

use std::collections::{BTreeMap, VecDeque};

use verlock_core::config::{CancelToken, ResolverConfig};
use verlock_core::constraint::VersionConstraint;
use verlock_core::lockfile::{LockDocument, LockEntry};
use verlock_core::requirement::Requirement;
use verlock_core::version::Version;
use verlock_index::cache::IndexCache;
use verlock_index::PackageIndex;
use verlock_util::errors::{VerlockError, VerlockResult};

use crate::conflict::{self, ConflictReport};
use crate::graph::{DependencyGraph, GraphSnapshot};

/// A committed version choice with everything needed to revisit it.
struct Decision {
    package: String,
    version: Version,
    /// Lower candidates that also satisfied the constraint set at decision
    /// time, descending.
    untried: Vec<Version>,
    /// Graph checkpoint taken just before this choice was applied.
    graph: GraphSnapshot,
    /// Pending requirements just before this choice queued its dependencies.
    queue: VecDeque<Requirement>,
}

/// Successful outcome: the version assignment plus the final graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub assignments: BTreeMap<String, Version>,
    pub graph: DependencyGraph,
}

impl Resolution {
    /// Flatten into the reproducible lock document.
    pub fn lock_document(&self) -> LockDocument {
        let mut entries = Vec::with_capacity(self.assignments.len());
        for (name, version) in &self.assignments {
            let mut entry = LockEntry {
                name: name.clone(),
                version: version.clone(),
                checksum: None,
                dependencies: self.graph.dependencies_of(name),
            };
            entry.checksum = Some(entry.compute_checksum());
            entries.push(entry);
        }
        LockDocument::new(entries)
    }
}

/// The outcome of a resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Resolved(Resolution),
    Conflict(ConflictReport),
}

impl ResolutionResult {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Self::Resolved(resolution) => Some(resolution),
            Self::Conflict(_) => None,
        }
    }

    pub fn conflict(&self) -> Option<&ConflictReport> {
        match self {
            Self::Resolved(_) => None,
            Self::Conflict(report) => Some(report),
        }
    }
}

/// Resolve `requirements` against `index` with default configuration.
pub fn resolve(
    requirements: Vec<Requirement>,
    index: &dyn PackageIndex,
) -> VerlockResult<ResolutionResult> {
    Resolver::new(index).resolve(requirements)
}

/// Single-use resolution driver.
///
/// One resolver owns one run: the graph, the decision stack, and the index
/// response cache all live and die with `resolve`, which consumes `self` so
/// cached metadata can never leak into a later run.
pub struct Resolver<'a> {
    cache: IndexCache<'a>,
    config: ResolverConfig,
    cancel: CancelToken,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a dyn PackageIndex) -> Self {
        Self {
            cache: IndexCache::new(index),
            config: ResolverConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn resolve(mut self, requirements: Vec<Requirement>) -> VerlockResult<ResolutionResult> {
        let mut graph = DependencyGraph::new();
        let mut queue: VecDeque<Requirement> = requirements.into();
        let mut stack: Vec<Decision> = Vec::new();
        let mut steps = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                return Err(VerlockError::Cancelled);
            }
            let Some(req) = queue.pop_front() else {
                break;
            };
            steps += 1;
            if steps > self.config.max_steps {
                return Err(VerlockError::MaxDepthExceeded {
                    steps: self.config.max_steps,
                });
            }

            let package = req.package.clone();
            graph.add_requirement(req);

            let (resolved, dirty) = match graph.node(&package) {
                Some(node) => (node.resolved_version.clone(), node.dirty),
                None => (None, false),
            };

            if let Some(version) = resolved {
                if !dirty {
                    // Chosen version absorbs the new constraint; no new work.
                    // This is also what keeps dependency cycles finite.
                    continue;
                }
                tracing::debug!("{package} {version} invalidated by a new constraint");
                if let Some(report) = self.backtrack(&mut graph, &mut queue, &mut stack, &package)?
                {
                    return Ok(ResolutionResult::Conflict(report));
                }
                continue;
            }

            if let Some(report) = self.select(&mut graph, &mut queue, &mut stack, &package)? {
                return Ok(ResolutionResult::Conflict(report));
            }
        }

        let trail = trail_of(&stack);
        if let Some(report) = conflict::validate(&graph, &trail) {
            return Ok(ResolutionResult::Conflict(report));
        }
        let assignments = graph.assignments();
        Ok(ResolutionResult::Resolved(Resolution { assignments, graph }))
    }

    /// Choose the highest candidate for an unresolved package, or start
    /// backtracking when none fits.
    fn select(
        &mut self,
        graph: &mut DependencyGraph,
        queue: &mut VecDeque<Requirement>,
        stack: &mut Vec<Decision>,
        package: &str,
    ) -> VerlockResult<Option<ConflictReport>> {
        let candidates: Vec<Version> = self.cache.available_versions(package)?.to_vec();
        let constraint = graph
            .node(package)
            .map(|node| node.intersected())
            .unwrap_or_default();

        match constraint.highest_satisfying(&candidates).cloned() {
            Some(version) => {
                let untried: Vec<Version> = candidates
                    .iter()
                    .filter(|c| **c < version && constraint.matches(c))
                    .cloned()
                    .collect();
                let graph_at = graph.snapshot();
                let queue_at = queue.clone();
                self.commit(
                    graph,
                    queue,
                    stack,
                    package.to_string(),
                    version,
                    untried,
                    graph_at,
                    queue_at,
                )?;
                Ok(None)
            }
            None => self.backtrack(graph, queue, stack, package),
        }
    }

    /// Apply a version choice: mark the node resolved, queue the chosen
    /// version's dependencies, and record the decision frame.
    #[allow(clippy::too_many_arguments)]
    fn commit(
        &mut self,
        graph: &mut DependencyGraph,
        queue: &mut VecDeque<Requirement>,
        stack: &mut Vec<Decision>,
        package: String,
        version: Version,
        untried: Vec<Version>,
        graph_at: GraphSnapshot,
        queue_at: VecDeque<Requirement>,
    ) -> VerlockResult<()> {
        tracing::debug!("selected {package} {version}");
        graph.set_resolved(&package, version.clone());

        // BTreeMap iteration gives name order, the deterministic tie-break
        // when several packages become eligible at once.
        let deps = self.cache.dependencies_of(&package, &version)?;
        for (dep, expr) in deps {
            let constraint = VersionConstraint::parse(expr)?;
            queue.push_back(Requirement::from_package(
                dep.clone(),
                constraint,
                package.clone(),
                version.clone(),
            ));
        }

        stack.push(Decision {
            package,
            version,
            untried,
            graph: graph_at,
            queue: queue_at,
        });
        Ok(())
    }

    /// Chronological backtracking after `package` ran out of candidates:
    /// revisit the most recent decision on `package` itself that still has
    /// untried lower candidates, else the most recent decision with any.
    /// Returns the conflict report once no alternative remains.
    fn backtrack(
        &mut self,
        graph: &mut DependencyGraph,
        queue: &mut VecDeque<Requirement>,
        stack: &mut Vec<Decision>,
        package: &str,
    ) -> VerlockResult<Option<ConflictReport>> {
        let report = conflict::explain(graph, package, &trail_of(stack));
        tracing::debug!("conflict on {package}, backtracking");

        let position = stack
            .iter()
            .rposition(|d| d.package == package && !d.untried.is_empty())
            .or_else(|| stack.iter().rposition(|d| !d.untried.is_empty()));
        let Some(position) = position else {
            return Ok(Some(report));
        };

        stack.truncate(position + 1);
        let Some(mut decision) = stack.pop() else {
            return Ok(Some(report));
        };

        // Rewind to the checkpoint; replay regenerates everything the
        // discarded decisions had queued.
        graph.restore(&decision.graph);
        *queue = decision.queue.clone();

        let next = decision.untried.remove(0);
        tracing::debug!("retrying {} with {next}", decision.package);
        self.commit(
            graph,
            queue,
            stack,
            decision.package,
            next,
            decision.untried,
            decision.graph,
            decision.queue,
        )?;
        Ok(None)
    }
}

fn trail_of(stack: &[Decision]) -> Vec<(String, Version)> {
    stack
        .iter()
        .map(|d| (d.package.clone(), d.version.clone()))
        .collect()
}
