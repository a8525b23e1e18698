//! Read-only view of a successful resolution for tree rendering, reverse
//! dependency lookup, and root-to-package path queries.
//!
//! Built once from a `Resolution`; never consulted by the search itself.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use verlock_core::version::Version;

use crate::resolver::Resolution;

/// A resolved package in the view.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TreeNode {
    pub name: String,
    pub version: Version,
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A resolved dependency graph backed by petgraph.
pub struct ResolvedGraph {
    graph: DiGraph<TreeNode, ()>,
    /// Lookup from package name to node index.
    index: HashMap<String, NodeIndex>,
    /// Packages nothing depends on, in name order.
    roots: Vec<NodeIndex>,
}

impl ResolvedGraph {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for (name, version) in &resolution.assignments {
            let idx = graph.add_node(TreeNode {
                name: name.clone(),
                version: version.clone(),
            });
            index.insert(name.clone(), idx);
        }
        for name in resolution.assignments.keys() {
            let Some(&from) = index.get(name) else {
                continue;
            };
            for dep in resolution.graph.dependencies_of(name).keys() {
                if let Some(&to) = index.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        let mut roots: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&idx| {
                graph
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();
        roots.sort_by(|a, b| graph[*a].name.cmp(&graph[*b].name));

        Self {
            graph,
            index,
            roots,
        }
    }

    /// Look up a package by name.
    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        self.index.get(name).map(|&idx| &self.graph[idx])
    }

    /// Direct dependencies of a package.
    pub fn dependencies_of(&self, name: &str) -> Vec<&TreeNode> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&TreeNode> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| &self.graph[e.target()])
            .collect();
        deps.sort_by(|a, b| a.name.cmp(&b.name));
        deps
    }

    /// Reverse dependencies (who depends on this package).
    pub fn dependents_of(&self, name: &str) -> Vec<&TreeNode> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&TreeNode> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| &self.graph[e.source()])
            .collect();
        deps.sort_by(|a, b| a.name.cmp(&b.name));
        deps
    }

    /// Render the dependency tree from every root package.
    pub fn print_tree(&self) -> String {
        let mut output = String::new();
        let mut visited = HashSet::new();
        for &root in &self.roots {
            let node = &self.graph[root];
            output.push_str(&format!("{node}\n"));
            visited.insert(root);
            let children = self.sorted_children(root);
            let count = children.len();
            for (i, child) in children.into_iter().enumerate() {
                let is_last = i == count - 1;
                self.print_subtree(&mut output, child, "", is_last, &mut visited);
            }
            visited.remove(&root);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}\n"));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let children = self.sorted_children(idx);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let last = i == count - 1;
            self.print_subtree(output, child, &child_prefix, last, visited);
        }

        visited.remove(&idx);
    }

    fn sorted_children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        children.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));
        children
    }

    /// Find a path from some root to `target`, for answering "why is this
    /// package in my tree".
    pub fn find_path(&self, target: &str) -> Option<Vec<&TreeNode>> {
        let &target_idx = self.index.get(target)?;
        for &root in &self.roots {
            let mut path = Vec::new();
            let mut visited = HashSet::new();
            if self.dfs_path(root, target_idx, &mut path, &mut visited) {
                return Some(path.iter().map(|&idx| &self.graph[idx]).collect());
            }
        }
        None
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for child in self.sorted_children(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
