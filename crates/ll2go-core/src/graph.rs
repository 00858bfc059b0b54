//! Control flow graphs: directed multigraphs of named nodes with optionally
//! labeled edges and one distinguished entry node.
//!
//! Node names are opaque strings, unique within a function. Iteration order
//! is sorted by name so every analysis downstream is deterministic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Label on a CFG edge: the branch outcome of a two-way conditional.
/// Unlabeled edges are unconditional transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeLabel {
    True,
    False,
}

impl EdgeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeLabel::True => "true",
            EdgeLabel::False => "false",
        }
    }
}

/// Parse an optional textual edge label.
pub(crate) fn parse_edge_label(graph: &str, label: Option<&str>) -> Result<Option<EdgeLabel>> {
    match label {
        None => Ok(None),
        Some("true") => Ok(Some(EdgeLabel::True)),
        Some("false") => Ok(Some(EdgeLabel::False)),
        // ll2dot writes node labels too; anything that is not a branch
        // outcome on an edge is a host error.
        Some(other) => Err(CoreError::UnknownEdgeLabel {
            graph: graph.to_string(),
            label: other.to_string(),
        }),
    }
}

/// A directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<EdgeLabel>,
}

/// A function's control flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cfg {
    name: String,
    entry: String,
    nodes: BTreeSet<String>,
    edges: Vec<Edge>,
}

impl Cfg {
    /// Create a graph containing only the entry node.
    pub fn new(name: impl Into<String>, entry: impl Into<String>) -> Cfg {
        let entry = entry.into();
        let mut nodes = BTreeSet::new();
        nodes.insert(entry.clone());
        Cfg {
            name: name.into(),
            entry,
            nodes,
            edges: Vec::new(),
        }
    }

    /// Build a CFG from a parsed DOT graph. The entry is the first declared
    /// node; node attributes are ignored, edge labels must be branch
    /// outcomes.
    pub fn from_dot(graph: &dotgraph::Graph) -> Result<Cfg> {
        let first = graph.nodes.first().ok_or_else(|| CoreError::EmptyGraph {
            graph: graph.name.clone(),
        })?;
        let mut cfg = Cfg::new(graph.name.clone(), first.id.clone());
        for node in &graph.nodes {
            cfg.add_node(node.id.clone());
        }
        for edge in &graph.edges {
            let label = parse_edge_label(&graph.name, edge.label())?;
            cfg.add_edge(edge.from.clone(), edge.to.clone(), label);
        }
        Ok(cfg)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Re-point the entry at an existing node.
    pub fn set_entry(&mut self, node: &str) {
        debug_assert!(self.nodes.contains(node));
        self.entry = node.to_string();
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// Insert a node; returns false if it was already present.
    pub fn add_node(&mut self, node: impl Into<String>) -> bool {
        self.nodes.insert(node.into())
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, node: &str) {
        self.nodes.remove(node);
        self.edges.retain(|e| e.from != node && e.to != node);
    }

    /// Insert an edge; endpoints are created if absent. Parallel edges are
    /// allowed — this is a multigraph.
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        label: Option<EdgeLabel>,
    ) {
        let from = from.into();
        let to = to.into();
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        self.edges.push(Edge { from, to, label });
    }

    /// Node names in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    pub fn out_edges<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.from == node)
    }

    pub fn in_edges<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.to == node)
    }

    /// All edges from `from` to `to` (there may be several).
    pub fn edges_between<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .iter()
            .filter(move |e| e.from == from && e.to == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_iterate_sorted() {
        let mut g = Cfg::new("f", "entry");
        g.add_edge("entry", "z", None);
        g.add_edge("entry", "a", Some(EdgeLabel::True));
        let names: Vec<&str> = g.nodes().collect();
        assert_eq!(names, vec!["a", "entry", "z"]);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut g = Cfg::new("f", "a");
        g.add_edge("a", "b", None);
        g.add_edge("b", "c", None);
        g.add_edge("c", "a", None);
        g.remove_node("b");
        assert_eq!(g.len(), 2);
        assert_eq!(g.edges().len(), 1);
        assert_eq!(g.edges()[0].from, "c");
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut g = Cfg::new("f", "a");
        g.add_edge("a", "b", Some(EdgeLabel::True));
        g.add_edge("a", "b", Some(EdgeLabel::False));
        assert_eq!(g.edges_between("a", "b").count(), 2);
    }

    #[test]
    fn from_dot_takes_first_node_as_entry() {
        let dot = dotgraph::Graph::parse(
            "digraph f { A\nB\nA -> B [label=\"true\"]\nA -> B [label=\"false\"] }",
        )
        .unwrap();
        let cfg = Cfg::from_dot(&dot).unwrap();
        assert_eq!(cfg.name(), "f");
        assert_eq!(cfg.entry(), "A");
        assert_eq!(cfg.len(), 2);
        assert_eq!(
            cfg.edges()[0].label,
            Some(EdgeLabel::True)
        );
    }

    #[test]
    fn from_dot_rejects_unknown_edge_label() {
        let dot = dotgraph::Graph::parse("digraph f { A -> B [label=\"maybe\"] }").unwrap();
        assert!(matches!(
            Cfg::from_dot(&dot),
            Err(CoreError::UnknownEdgeLabel { .. })
        ));
    }

    #[test]
    fn from_dot_rejects_empty_graph() {
        let dot = dotgraph::Graph::parse("digraph f { }").unwrap();
        assert!(matches!(
            Cfg::from_dot(&dot),
            Err(CoreError::EmptyGraph { .. })
        ));
    }
}
