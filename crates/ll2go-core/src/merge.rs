//! Collapse a matched subgraph into a single node.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Shape;
use crate::graph::{Cfg, Edge};

/// Replace the matched node set with a single node and return its name.
///
/// The node takes the matched entry member's name. That name is unique in
/// the graph once the members are removed, and it is the only name outside
/// terminators can refer to: external in-edges are restricted to the entry,
/// so every branch into the collapsed region targeted exactly this block.
/// Keeping it is what lets later synthesis steps verify branch targets
/// against merged nodes.
///
/// External in-edges redirect to the new node, external out-edges (which the
/// matcher only permits on the exit) re-source from it, labels preserved.
/// Interior edges — self-loops included — are discarded. If the matched set
/// contained the graph entry, the new node becomes the entry.
pub fn merge(cfg: &mut Cfg, mapping: &BTreeMap<String, String>, shape: &Shape) -> String {
    let matched: BTreeSet<&str> = mapping.values().map(String::as_str).collect();

    let new_name = mapping
        .get(shape.entry())
        .cloned()
        .expect("mapping covers the shape entry");
    let entry_merged = matched.contains(cfg.entry());

    let mut edges = Vec::with_capacity(cfg.edges().len());
    for e in cfg.edges() {
        let from_in = matched.contains(e.from.as_str());
        let to_in = matched.contains(e.to.as_str());
        match (from_in, to_in) {
            (true, true) => {}
            (true, false) => edges.push(Edge {
                from: new_name.clone(),
                to: e.to.clone(),
                label: e.label,
            }),
            (false, true) => edges.push(Edge {
                from: e.from.clone(),
                to: new_name.clone(),
                label: e.label,
            }),
            (false, false) => edges.push(e.clone()),
        }
    }

    // Remove members before installing the rewired edges: the new node
    // shares the entry member's name, and node removal drops incident edges.
    for node in &matched {
        cfg.remove_node(node);
    }
    cfg.add_node(new_name.clone());
    cfg.set_edges(edges);
    if entry_merged {
        cfg.set_entry(&new_name);
    }
    new_name
}
