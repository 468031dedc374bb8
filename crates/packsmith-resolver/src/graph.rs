//! Dependency graph of published packs, for display and path queries.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use packsmith_core::identifier::{sort_by_highest_version, Identifier};
use packsmith_core::package::Package;

use crate::registry::Registry;

/// Edge label in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepEdge {
    /// The target is the chosen (highest) version for its pack line, rather
    /// than one of the other acceptable versions.
    pub selected: bool,
}

/// Packs and their direct dependencies, backed by petgraph.
///
/// Edges run from a pack to every acceptable version of each pack line it
/// declares directly.
pub struct DependencyGraph {
    graph: DiGraph<Identifier, DepEdge>,
    index: HashMap<Identifier, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    pub fn from_registry(registry: &Registry) -> Self {
        Self::from_packages(registry.packages().map(|p| &**p))
    }

    pub fn from_packages<'a, I>(packages: I) -> Self
    where
        I: IntoIterator<Item = &'a Package>,
    {
        let packages: Vec<&Package> = packages.into_iter().collect();
        let known: HashSet<&Identifier> = packages.iter().map(|p| p.identifier()).collect();

        let mut graph = Self::new();
        for package in &packages {
            let from = graph.add_node(package.identifier().clone());
            for name in package.declared_names() {
                let Some(acceptable) = package.filtered_map().get(name) else {
                    continue;
                };
                // Versions that never made it into the set (failed compiles) get no node.
                let targets = acceptable.iter().filter(|target| known.contains(target));
                for (i, target) in targets.enumerate() {
                    let to = graph.add_node(target.clone());
                    graph.add_edge(from, to, DepEdge { selected: i == 0 });
                }
            }
        }
        graph
    }

    /// Add or retrieve a node.
    pub fn add_node(&mut self, identifier: Identifier) -> NodeIndex {
        if let Some(&idx) = self.index.get(&identifier) {
            return idx;
        }
        let idx = self.graph.add_node(identifier.clone());
        self.index.insert(identifier, idx);
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DepEdge) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, edge);
        }
    }

    pub fn find(&self, identifier: &Identifier) -> Option<NodeIndex> {
        self.index.get(identifier).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Identifier {
        &self.graph[idx]
    }

    /// Direct dependencies of a node, in identifier order.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        self.neighbors(idx, Direction::Outgoing)
    }

    /// Reverse dependencies (who depends on this node), in identifier order.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &DepEdge)> {
        self.neighbors(idx, Direction::Incoming)
    }

    fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<(NodeIndex, &DepEdge)> {
        let mut found: Vec<(NodeIndex, &DepEdge)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = if direction == Direction::Outgoing {
                    e.target()
                } else {
                    e.source()
                };
                (other, e.weight())
            })
            .collect();
        found.sort_by(|a, b| self.graph[a.0].cmp(&self.graph[b.0]));
        found
    }

    /// Packs nothing else depends on, in identifier order.
    pub fn roots(&self) -> Vec<NodeIndex> {
        let mut roots: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();
        roots.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        roots
    }

    /// Resolve a user-provided key to a node.
    ///
    /// Accepts `namespace:name@version`, `namespace:name` (highest version),
    /// or a bare `name` (first match, highest version).
    pub fn resolve_key(&self, key: &str) -> Option<NodeIndex> {
        if let Ok(identifier) = Identifier::parse(key) {
            return self.find(&identifier);
        }
        let matching = self.index.keys().filter(|id| {
            let line = id.name();
            line.to_string() == key || line.name() == key
        });
        let best = sort_by_highest_version(matching.cloned()).into_iter().next()?;
        self.find(&best)
    }

    /// Print the tree of selected versions below every root.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        for root in self.roots() {
            output.push_str(&format!("{}\n", self.graph[root]));
            let mut visited = HashSet::new();
            visited.insert(root);
            let deps = self.selected_dependencies(root);
            let count = deps.len();
            for (i, child) in deps.iter().enumerate() {
                let is_last = i == count - 1;
                self.print_subtree(&mut output, *child, "", is_last, 1, max_depth, &mut visited);
            }
        }
        output
    }

    fn selected_dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.dependencies_of(idx)
            .into_iter()
            .filter(|(_, edge)| edge.selected)
            .map(|(child, _)| child)
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}\n"));

        if let Some(max) = max_depth {
            if depth >= max {
                return;
            }
        }

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let deps = self.selected_dependencies(idx);
        let count = deps.len();
        for (i, child) in deps.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_subtree(
                output,
                *child,
                &child_prefix,
                is_last,
                depth + 1,
                max_depth,
                visited,
            );
        }

        visited.remove(&idx);
    }

    /// Find a chain of dependency edges from `from` to `to`.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<&Identifier>> {
        let start = self.resolve_key(from)?;
        let target = self.resolve_key(to)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(start, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
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
        for (child, _) in self.dependencies_of(current) {
            if self.dfs_path(child, target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Inverted tree for one pack: everything that depends on it, up to the
    /// roots.
    pub fn print_inverted_tree(&self, key: &str) -> String {
        let mut output = String::new();
        let Some(idx) = self.resolve_key(key) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::new();
        visited.insert(idx);
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, _)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(&mut output, *dep_idx, "", is_last, &mut visited);
        }
        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!("{prefix}{connector}{}\n", self.graph[idx]));
        if !visited.insert(idx) {
            return;
        }
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, _)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(output, *dep_idx, &child_prefix, is_last, visited);
        }
        visited.remove(&idx);
    }

    /// Dependencies before dependents. `Err` names a pack on a cycle.
    pub fn topological_order(&self) -> Result<Vec<&Identifier>, &Identifier> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().rev().map(|idx| &self.graph[idx]).collect()),
            Err(cycle) => Err(&self.graph[cycle.node_id()]),
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
