//! The control-flow-primitive catalog.
//!
//! Each primitive is a small reducible CFG pattern with a known structured
//! equivalent. Shapes are described as DOT graphs whose node labels mark the
//! `entry` and `exit` roles; edge labels carry branch outcomes where the
//! shape requires them. The catalog is parsed once — either the built-in
//! shapes below or `<name>.dot` files from a host-supplied directory — and
//! stays immutable for the lifetime of the decompiler.

use std::fs;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::graph::{parse_edge_label, Cfg};

/// Shape names in match-priority order. `list` first greedily chains
/// straight-line code; loops before `if_return` so backedges are not
/// misread as fall-through returns.
pub const SHAPE_NAMES: [&str; 6] = ["list", "if", "if_else", "pre_loop", "post_loop", "if_return"];

const LIST_DOT: &str = r#"
digraph list {
    A [label="entry"]
    B [label="exit"]
    A->B
}
"#;

const IF_DOT: &str = r#"
digraph if {
    A [label="entry"]
    B
    C [label="exit"]
    A->B [label="true"]
    A->C [label="false"]
    B->C
}
"#;

const IF_ELSE_DOT: &str = r#"
digraph if_else {
    A [label="entry"]
    B
    C
    D [label="exit"]
    A->B [label="true"]
    A->C [label="false"]
    B->D
    C->D
}
"#;

const PRE_LOOP_DOT: &str = r#"
digraph pre_loop {
    A [label="entry"]
    B
    C [label="exit"]
    A->B [label="true"]
    B->A
    A->C [label="false"]
}
"#;

const POST_LOOP_DOT: &str = r#"
digraph post_loop {
    A [label="entry"]
    B [label="exit"]
    A->A [label="true"]
    A->B [label="false"]
}
"#;

// Edges deliberately unlabeled: the return arm may sit on either branch
// polarity. The synthesizer recovers the polarity from the terminator.
const IF_RETURN_DOT: &str = r#"
digraph if_return {
    A [label="entry"]
    B
    C [label="exit"]
    A->B
    A->C
}
"#;

/// A control flow primitive: a named shape graph with entry/exit roles.
#[derive(Debug, Clone)]
pub struct Shape {
    name: String,
    graph: Cfg,
    entry: String,
    exit: Option<String>,
}

impl Shape {
    /// Build a shape from a parsed DOT graph. The graph name becomes the
    /// shape name; exactly one node must be labeled `entry`, at most one
    /// `exit`.
    pub fn from_dot(dot: &dotgraph::Graph) -> Result<Shape> {
        let mut entry = None;
        let mut exit = None;
        for node in &dot.nodes {
            match node.label() {
                Some("entry") => entry = Some(node.id.clone()),
                Some("exit") => exit = Some(node.id.clone()),
                _ => {}
            }
        }
        let entry = entry.ok_or(CoreError::MissingRole {
            graph: dot.name.clone(),
            role: "entry",
        })?;

        let mut graph = Cfg::new(dot.name.clone(), entry.clone());
        for node in &dot.nodes {
            graph.add_node(node.id.clone());
        }
        for edge in &dot.edges {
            let label = parse_edge_label(&dot.name, edge.label())?;
            graph.add_edge(edge.from.clone(), edge.to.clone(), label);
        }

        Ok(Shape {
            name: dot.name.clone(),
            graph,
            entry,
            exit,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Cfg {
        &self.graph
    }

    /// The shape node playing the entry role.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// The shape node playing the exit role, if the shape has one.
    pub fn exit(&self) -> Option<&str> {
        self.exit.as_deref()
    }
}

/// The ordered, immutable primitive catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    shapes: Vec<Shape>,
}

impl Catalog {
    /// The built-in six-shape catalog.
    pub fn builtin() -> Catalog {
        let sources = [
            LIST_DOT,
            IF_DOT,
            IF_ELSE_DOT,
            PRE_LOOP_DOT,
            POST_LOOP_DOT,
            IF_RETURN_DOT,
        ];
        let shapes = sources
            .iter()
            .map(|src| {
                let dot = dotgraph::Graph::parse(src).expect("built-in shape parses");
                Shape::from_dot(&dot).expect("built-in shape is well-formed")
            })
            .collect();
        Catalog { shapes }
    }

    /// Load `<name>.dot` for every catalog shape, in priority order, from a
    /// host-supplied directory. A missing or malformed file is fatal.
    pub fn load_dir(dir: &Path) -> Result<Catalog> {
        let mut shapes = Vec::with_capacity(SHAPE_NAMES.len());
        for name in SHAPE_NAMES {
            let path = dir.join(format!("{name}.dot"));
            if !path.is_file() {
                return Err(CoreError::MissingShape(name.to_string()));
            }
            let src = fs::read_to_string(&path)?;
            let dot = dotgraph::Graph::parse(&src).map_err(|source| CoreError::GraphParse {
                file: path.clone(),
                source,
            })?;
            shapes.push(Shape::from_dot(&dot)?);
        }
        Ok(Catalog { shapes })
    }

    /// Shapes in match-priority order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeLabel;

    #[test]
    fn builtin_catalog_order_and_roles() {
        let catalog = Catalog::builtin();
        let names: Vec<&str> = catalog.shapes().iter().map(Shape::name).collect();
        assert_eq!(names, SHAPE_NAMES);
        for shape in catalog.shapes() {
            assert_eq!(shape.entry(), "A");
            assert!(shape.exit().is_some());
            assert!(shape.graph().contains(shape.entry()));
        }
    }

    #[test]
    fn builtin_if_shape_edges() {
        let catalog = Catalog::builtin();
        let ifshape = &catalog.shapes()[1];
        assert_eq!(ifshape.name(), "if");
        assert_eq!(ifshape.exit(), Some("C"));
        let edge = ifshape.graph().edges_between("A", "B").next().unwrap();
        assert_eq!(edge.label, Some(EdgeLabel::True));
        let edge = ifshape.graph().edges_between("B", "C").next().unwrap();
        assert_eq!(edge.label, None);
    }

    #[test]
    fn post_loop_has_self_edge() {
        let catalog = Catalog::builtin();
        let post = &catalog.shapes()[4];
        assert_eq!(post.name(), "post_loop");
        assert_eq!(post.graph().edges_between("A", "A").count(), 1);
    }

    #[test]
    fn if_return_edges_are_unlabeled() {
        let catalog = Catalog::builtin();
        let shape = &catalog.shapes()[5];
        assert_eq!(shape.name(), "if_return");
        assert!(shape.graph().edges().iter().all(|e| e.label.is_none()));
    }

    #[test]
    fn shape_requires_entry_role() {
        let dot = dotgraph::Graph::parse("digraph nameless { A\nB\nA->B }").unwrap();
        assert!(matches!(
            Shape::from_dot(&dot),
            Err(CoreError::MissingRole { role: "entry", .. })
        ));
    }

    #[test]
    fn load_dir_reports_missing_shape() {
        let dir = std::env::temp_dir().join("ll2go-empty-catalog");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(matches!(
            Catalog::load_dir(&dir),
            Err(CoreError::MissingShape(name)) if name == "list"
        ));
    }
}
