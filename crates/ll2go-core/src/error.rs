use std::path::PathBuf;

use crate::ir::Opcode;

/// Core error type for the decompiler.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("malformed basic block {block:?}: {reason}")]
    MalformedBlock { block: String, reason: String },

    #[error("unsupported instruction opcode {0}")]
    UnsupportedOpcode(Opcode),

    #[error("unsupported comparison predicate {0:?}")]
    UnsupportedPredicate(String),

    #[error("instruction {0} produces a value but has no result name")]
    MissingResult(Opcode),

    #[error("local {0:?} collides with the renamed anonymous-local namespace")]
    ReservedLocal(String),

    #[error("branch does not fit the matched subgraph: {0}")]
    BranchShapeMismatch(String),

    #[error(
        "no control flow primitive matches the graph after trying {last_shape:?}; \
         remaining nodes: {nodes:?}"
    )]
    UnstructuredGraph {
        nodes: Vec<String>,
        last_shape: String,
    },

    #[error("no basic block named {0:?}")]
    MissingBlock(String),

    #[error("final block {0:?} retains a branch terminator after restructuring")]
    TrailingTerminator(String),

    #[error("primitive catalog has no {0:?} shape file")]
    MissingShape(String),

    #[error("control flow primitive {0:?} is not supported")]
    UnsupportedShape(String),

    #[error("graph {graph:?} has no node labeled {role:?}")]
    MissingRole { graph: String, role: &'static str },

    #[error("graph {graph:?} contains no nodes")]
    EmptyGraph { graph: String },

    #[error("unknown edge label {label:?} in graph {graph:?}")]
    UnknownEdgeLabel { graph: String, label: String },

    #[error("parse error in {file}: {source}")]
    GraphParse {
        file: PathBuf,
        #[source]
        source: dotgraph::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
