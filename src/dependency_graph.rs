//! Directed file dependency graph restricted to one selection
//!
//! Nodes are selected file ids; an edge `a -> b` means `a` imports `b`. Edges
//! have set semantics and self-imports are never recorded.

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::catalog::FileId;
use crate::path_utils::parent_dir;
use crate::resolver::{PathResolver, ResolutionRules};
use crate::types::DependencyNode;

/// Outcome of an elementary cycle search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSearch {
    pub cycles: Vec<Vec<FileId>>,
    /// The search stopped at its cycle limit
    pub truncated: bool,
}

/// Petgraph-backed graph keyed by file id
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<FileId, ()>,
    file_to_node: HashMap<FileId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file node; adding a known id returns the existing node
    pub fn add_file(&mut self, file_id: &str) -> NodeIndex {
        if let Some(&idx) = self.file_to_node.get(file_id) {
            return idx;
        }
        let idx = self.graph.add_node(file_id.to_string());
        self.file_to_node.insert(file_id.to_string(), idx);
        idx
    }

    /// Record that `from` imports `to`
    ///
    /// Returns `false` for self-edges, unknown ids and edges already present.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        let (Some(&a), Some(&b)) = (self.file_to_node.get(from), self.file_to_node.get(to)) else {
            return false;
        };
        if self.graph.contains_edge(a, b) {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn has_dependency(&self, from: &str, to: &str) -> bool {
        match (self.file_to_node.get(from), self.file_to_node.get(to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges as `(importer, imported)` in insertion order
    pub fn edges(&self) -> Vec<(FileId, FileId)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].clone(),
                    self.graph[edge.target()].clone(),
                )
            })
            .collect()
    }

    /// Every elementary cycle, each reported once, up to `limit` cycles
    ///
    /// Cycles are searched per strongly connected component. Within a
    /// component each cycle is rooted at its earliest-inserted member, so
    /// rotations of the same cycle never appear twice.
    pub fn elementary_cycles(&self, limit: usize) -> CycleSearch {
        let mut search = CycleSearch::default();
        let components = petgraph::algo::tarjan_scc(&self.graph);
        if limit == 0 {
            search.truncated = components.iter().any(|c| c.len() > 1);
            return search;
        }

        for mut component in components {
            if component.len() < 2 {
                continue;
            }
            component.sort();

            let members: HashSet<NodeIndex> = component.iter().copied().collect();
            let successors: HashMap<NodeIndex, Vec<NodeIndex>> = component
                .iter()
                .map(|&idx| {
                    let mut next: Vec<NodeIndex> = self
                        .graph
                        .neighbors(idx)
                        .filter(|n| members.contains(n))
                        .collect();
                    next.sort();
                    (idx, next)
                })
                .collect();

            for (position, &start) in component.iter().enumerate() {
                let mut circuit = CircuitSearch {
                    graph: &self.graph,
                    successors: &successors,
                    allowed: component[position..].iter().copied().collect(),
                    start,
                    blocked: HashSet::new(),
                    blocked_by: HashMap::new(),
                    stack: Vec::new(),
                    limit,
                };
                circuit.circuit(start, &mut search);
                if search.truncated {
                    debug!("Cycle search stopped at limit {}", limit);
                    return search;
                }
            }
        }

        search
    }

    /// Graphviz rendering with nodes labeled by `label(file_id)`
    pub fn to_dot_with<F>(&self, label: F) -> String
    where
        F: Fn(&str) -> String,
    {
        use petgraph::dot::{Config, Dot};

        let labeled = self.graph.map(|_, id| label(id), |_, _| "");
        let dot = Dot::with_config(&labeled, &[Config::EdgeNoLabel]);
        format!("{}", dot)
    }
}

/// Johnson-style circuit enumeration from one start node
struct CircuitSearch<'g> {
    graph: &'g DiGraph<FileId, ()>,
    successors: &'g HashMap<NodeIndex, Vec<NodeIndex>>,
    allowed: HashSet<NodeIndex>,
    start: NodeIndex,
    blocked: HashSet<NodeIndex>,
    blocked_by: HashMap<NodeIndex, HashSet<NodeIndex>>,
    stack: Vec<NodeIndex>,
    limit: usize,
}

impl CircuitSearch<'_> {
    fn circuit(&mut self, node: NodeIndex, search: &mut CycleSearch) -> bool {
        let mut closed = false;
        self.stack.push(node);
        self.blocked.insert(node);

        let successors = self.successors.get(&node).map(Vec::as_slice).unwrap_or(&[]);
        for &next in successors {
            if search.truncated {
                break;
            }
            if !self.allowed.contains(&next) {
                continue;
            }
            if next == self.start {
                search
                    .cycles
                    .push(self.stack.iter().map(|&idx| self.graph[idx].clone()).collect());
                closed = true;
                if search.cycles.len() >= self.limit {
                    search.truncated = true;
                }
            } else if !self.blocked.contains(&next) && self.circuit(next, search) {
                closed = true;
            }
        }

        if closed {
            self.unblock(node);
        } else {
            for &next in successors {
                if self.allowed.contains(&next) {
                    self.blocked_by.entry(next).or_default().insert(node);
                }
            }
        }

        self.stack.pop();
        closed
    }

    fn unblock(&mut self, node: NodeIndex) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if !self.blocked.remove(&current) {
                continue;
            }
            if let Some(waiting) = self.blocked_by.remove(&current) {
                pending.extend(waiting);
            }
        }
    }
}

/// Adds edges between selected files by resolving each node's imports
pub struct GraphBuilder<'c> {
    resolver: PathResolver<'c>,
}

impl<'c> GraphBuilder<'c> {
    pub fn new(resolver: PathResolver<'c>) -> Self {
        Self { resolver }
    }

    /// Fill `dependencies`/`dependents` on every node and classify it
    ///
    /// Only imports resolving to another selected file become edges.
    pub fn build(&self, nodes: &mut IndexMap<FileId, DependencyNode>) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        let selected_by_path: HashMap<&str, &str> = nodes
            .values()
            .map(|node| (node.file_path.as_str(), node.file_id.as_str()))
            .collect();

        for id in nodes.keys() {
            graph.add_file(id);
        }

        let mut edges = Vec::new();
        for node in nodes.values() {
            let rules = ResolutionRules::for_extension(&node.file_type);
            let importing_dir = parent_dir(&node.file_path);

            for specifier in &node.imports {
                let Some(resolved) = self.resolver.resolve(specifier, importing_dir, rules) else {
                    continue;
                };
                if let Some(&target) = selected_by_path.get(resolved.as_str()) {
                    if target != node.file_id {
                        edges.push((node.file_id.clone(), target.to_string()));
                    }
                }
            }
        }

        for (from, to) in edges {
            if !graph.add_dependency(&from, &to) {
                continue;
            }
            if let Some(node) = nodes.get_mut(&from) {
                node.dependencies.insert(to.clone());
            }
            if let Some(node) = nodes.get_mut(&to) {
                node.dependents.insert(from);
            }
        }

        for node in nodes.values_mut() {
            node.finalize();
        }

        debug!(
            "Built dependency graph: {} files, {} edges",
            graph.file_count(),
            graph.dependency_count()
        );
        graph
    }
}
