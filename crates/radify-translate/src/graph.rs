//! Reference graph management using `petgraph`.
//!
//! Builds a directed graph of references whose resolution recurses into the
//! target resource and rejects cycles before any output is constructed.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use radify_common::error::{RadifyError, Result};
use radify_common::types::ResourceKind;

use crate::expression::{CompositeValue, Expression};
use crate::manifest::Manifest;

/// DFS marking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// A directed graph of recursive references between resources.
///
/// An edge `a -> b` means resolving a value of `a` requires resolving a value
/// of `b`.
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    /// Creates an empty reference graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of recursive references in the manifest.
    ///
    /// A reference recurses when its path is `connectionString` or its target
    /// is a value resource. Binding references resolve to static values and
    /// are left out, as are references to names without a kind.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest, kinds: &BTreeMap<String, ResourceKind>) -> Self {
        let mut graph = Self::new();
        for (name, resource) in &manifest.resources {
            if !kinds.contains_key(name) {
                continue;
            }
            let _ = graph.add_resource(name);
            for value in resource.expression_values() {
                for expr in CompositeValue::parse(value).expressions() {
                    if recurses(expr, kinds) {
                        graph.add_reference(name, &expr.resource);
                    }
                }
            }
        }
        tracing::debug!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "reference graph built"
        );
        graph
    }

    /// Adds a resource node, returning the existing index if already present.
    pub fn add_resource(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        let _ = self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Adds a reference edge: resolving `from` requires resolving `to`.
    pub fn add_reference(&mut self, from: &str, to: &str) {
        let from = self.add_resource(from);
        let to = self.add_resource(to);
        if self.graph.find_edge(from, to).is_none() {
            let _ = self.graph.add_edge(from, to, ());
        }
    }

    /// Checks that the graph has no cycles.
    ///
    /// Nodes and their neighbors are visited in name order, so the reported
    /// cycle is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`RadifyError::CircularReference`] with the cycle path, whose
    /// last element repeats the node where the cycle closes.
    pub fn check_acyclic(&self) -> Result<()> {
        let mut marks: HashMap<NodeIndex, Mark> = HashMap::with_capacity(self.nodes.len());
        let mut chain: Vec<NodeIndex> = Vec::new();

        for idx in self.sorted(self.graph.node_indices()) {
            self.visit(idx, &mut marks, &mut chain)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        idx: NodeIndex,
        marks: &mut HashMap<NodeIndex, Mark>,
        chain: &mut Vec<NodeIndex>,
    ) -> Result<()> {
        match marks.get(&idx) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => return Err(self.cycle_error(idx, chain)),
            None => {}
        }

        let _ = marks.insert(idx, Mark::InProgress);
        chain.push(idx);
        for next in self.sorted(self.graph.neighbors(idx)) {
            self.visit(next, marks, chain)?;
        }
        let _ = chain.pop();
        let _ = marks.insert(idx, Mark::Done);
        Ok(())
    }

    /// Builds the error for a cycle closing at `idx`, dropping the part of the
    /// chain that leads into the cycle.
    fn cycle_error(&self, idx: NodeIndex, chain: &[NodeIndex]) -> RadifyError {
        let start = chain.iter().position(|&n| n == idx).unwrap_or(0);
        let cycle: Vec<String> = chain[start..]
            .iter()
            .chain(std::iter::once(&idx))
            .map(|&n| self.graph[n].clone())
            .collect();
        tracing::debug!(chain = %cycle.join(" -> "), "reference cycle found");
        RadifyError::CircularReference { chain: cycle }
    }

    fn sorted(&self, indices: impl Iterator<Item = NodeIndex>) -> Vec<NodeIndex> {
        let mut indices: Vec<NodeIndex> = indices.collect();
        indices.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        indices
    }
}

fn recurses(expr: &Expression, kinds: &BTreeMap<String, ResourceKind>) -> bool {
    match kinds.get(&expr.resource) {
        None => false,
        Some(ResourceKind::Value) => true,
        Some(_) => expr.is_connection_string(),
    }
}
