//! Subgraph isomorphism search for control flow primitives.
//!
//! A match is an injective `shape node → graph node` mapping under which
//! every shape edge has a label-compatible counterpart, edges between
//! matched nodes correspond exactly, and only the entry image keeps
//! incoming external edges / only the exit image keeps outgoing ones.
//! The exactness rule matters for priority: without it an `if` match could
//! swallow the backedge of a `pre_loop` that sits later in the catalog.
//!
//! Shapes have 2–4 nodes and functions have few blocks, so a plain
//! backtracking search over candidates in sorted name order is enough and
//! keeps results reproducible.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Shape;
use crate::graph::{Cfg, EdgeLabel};

/// Find an isomorphism of `shape` inside `cfg`. Returns the first match in
/// canonical (sorted) enumeration order, or `None`.
pub fn search(cfg: &Cfg, shape: &Shape) -> Option<BTreeMap<String, String>> {
    let snodes: Vec<&str> = shape.graph().nodes().collect();
    if snodes.len() > cfg.len() {
        return None;
    }
    let gnodes: Vec<&str> = cfg.nodes().collect();

    let mut assign: Vec<(&str, &str)> = Vec::with_capacity(snodes.len());
    let mut used: BTreeSet<&str> = BTreeSet::new();
    if backtrack(cfg, shape, &snodes, &gnodes, &mut assign, &mut used) {
        Some(
            assign
                .iter()
                .map(|&(u, g)| (u.to_string(), g.to_string()))
                .collect(),
        )
    } else {
        None
    }
}

fn backtrack<'a>(
    cfg: &Cfg,
    shape: &Shape,
    snodes: &[&'a str],
    gnodes: &[&'a str],
    assign: &mut Vec<(&'a str, &'a str)>,
    used: &mut BTreeSet<&'a str>,
) -> bool {
    if assign.len() == snodes.len() {
        return true;
    }
    let u = snodes[assign.len()];
    for &g in gnodes {
        if used.contains(g) {
            continue;
        }
        assign.push((u, g));
        used.insert(g);
        if candidate_ok(cfg, shape, assign) && backtrack(cfg, shape, snodes, gnodes, assign, used)
        {
            return true;
        }
        assign.pop();
        used.remove(g);
    }
    false
}

/// Check the constraints decidable once the newest pair is assigned:
/// degree bounds for the new node, and exact edge correspondence between it
/// and every node assigned so far (itself included, for self-loops).
fn candidate_ok(cfg: &Cfg, shape: &Shape, assign: &[(&str, &str)]) -> bool {
    let &(u, g) = assign.last().expect("candidate_ok on empty assignment");

    if !degree_ok(cfg, shape, u, g) {
        return false;
    }
    for &(v, h) in assign {
        if !edges_correspond(cfg, shape, u, g, v, h) {
            return false;
        }
        if u != v && !edges_correspond(cfg, shape, v, h, u, g) {
            return false;
        }
    }
    true
}

/// Every edge of an internal matched node must be the image of a shape
/// edge, so its degrees must equal the shape node's exactly. The entry may
/// additionally receive external in-edges, the exit external out-edges.
fn degree_ok(cfg: &Cfg, shape: &Shape, u: &str, g: &str) -> bool {
    let s_in = shape.graph().in_edges(u).count();
    let s_out = shape.graph().out_edges(u).count();
    let g_in = cfg.in_edges(g).count();
    let g_out = cfg.out_edges(g).count();

    let in_ok = if u == shape.entry() {
        g_in >= s_in
    } else {
        g_in == s_in
    };
    let out_ok = if Some(u) == shape.exit() {
        g_out >= s_out
    } else {
        g_out == s_out
    };
    in_ok && out_ok
}

/// Edges `u→v` in the shape and `g→h` in the graph must correspond exactly:
/// same count, and a label-compatible pairing exists (a labeled shape edge
/// needs the identical label; an unlabeled one takes whatever remains).
fn edges_correspond(cfg: &Cfg, shape: &Shape, u: &str, g: &str, v: &str, h: &str) -> bool {
    let shape_edges: Vec<Option<EdgeLabel>> = shape
        .graph()
        .edges_between(u, v)
        .map(|e| e.label)
        .collect();
    let mut g_labels: Vec<Option<EdgeLabel>> =
        cfg.edges_between(g, h).map(|e| e.label).collect();

    if shape_edges.len() != g_labels.len() {
        return false;
    }
    for label in shape_edges.iter().filter(|l| l.is_some()) {
        match g_labels.iter().position(|l| l == label) {
            Some(i) => {
                g_labels.swap_remove(i);
            }
            None => return false,
        }
    }
    true
}
