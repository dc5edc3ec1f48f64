//! Name-keyed dependency graph.
//!
//! Edges point from dependent to dependency: if A depends on B the edge is
//! `A -> B`, and ordering returns B before A.
//!
//! # Example
//!
//! ```
//! use hdlm_graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_edge("ADDR_BITS", "DEPTH");
//! graph.add_node("WIDTH");
//!
//! let order = graph.topological_order().unwrap();
//! assert_eq!(order, vec!["DEPTH", "ADDR_BITS", "WIDTH"]);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::convert::Infallible;

use crate::{Cycle, WalkError, walk, walk_lenient};

/// Directed graph of named nodes. Iteration order is alphabetical so every
/// ordering is deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Adjacency list: key depends on each value.
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no dependencies. Existing edges are kept.
    pub fn add_node(&mut self, id: impl Into<String>) {
        self.edges.entry(id.into()).or_default();
    }

    /// Declare that `from` depends on `to`, adding either node if missing.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.entry(to.to_string()).or_default();
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|deps| deps.len()).sum()
    }

    /// Direct dependencies of a node.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .get(id)
            .map(|deps| deps.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Every node, dependency-first.
    ///
    /// # Errors
    ///
    /// Returns the first [`Cycle`] found.
    pub fn topological_order(&self) -> Result<Vec<String>, Cycle> {
        walk(self.edges.keys(), |id| Ok::<_, Infallible>(self.owned_deps(id))).map_err(|e| match e {
            WalkError::Cycle(cycle) => cycle,
            WalkError::Expand(never) => match never {},
        })
    }

    /// Dependency-first order of the nodes that are not on any cycle, plus
    /// the cycles found.
    ///
    /// A node is skipped when it can reach itself, so every member of a
    /// strongly connected component is excluded even when the reported cycle
    /// paths do not pass through it. Nodes that merely depend on a cycle are
    /// kept.
    pub fn order_skipping_cycles(&self) -> (Vec<String>, Vec<Cycle>) {
        let (order, cycles) = match walk_lenient(self.edges.keys(), |id| {
            Ok::<_, Infallible>(self.owned_deps(id))
        }) {
            Ok(result) => result,
            Err(never) => match never {},
        };
        if cycles.is_empty() {
            return (order, cycles);
        }

        let cyclic: BTreeSet<&str> = self
            .edges
            .keys()
            .map(String::as_str)
            .filter(|id| self.reaches_itself(id))
            .collect();
        tracing::debug!(nodes = ?cyclic, "excluding cyclic nodes from ordering");
        let order = order
            .into_iter()
            .filter(|id| !cyclic.contains(id.as_str()))
            .collect();
        (order, cycles)
    }

    /// Whether a path of at least one edge leads from `id` back to `id`.
    fn reaches_itself(&self, id: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = self.dependencies_of(id);
        while let Some(next) = stack.pop() {
            if next == id {
                return true;
            }
            if seen.insert(next) {
                stack.extend(self.dependencies_of(next));
            }
        }
        false
    }

    fn owned_deps(&self, id: &str) -> Vec<String> {
        self.edges
            .get(id)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }
}
