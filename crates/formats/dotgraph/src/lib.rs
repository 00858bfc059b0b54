//! Parser for the DOT graph-description subset used by control flow graph
//! files and control-flow-primitive files.
//!
//! Two-layer architecture:
//! - **Layer 1** (`lexer`): character stream → tokens, with line tracking
//! - **Layer 2** (`parser`): tokens → [`Graph`] (named nodes, directed edges,
//!   `key=value` attributes)
//!
//! Only the subset the graph files actually use is accepted: `digraph`
//! headers, node statements with attribute lists, `->` edge statements
//! (including chains), quoted and bare identifiers, and `//`, `/* */` and
//! `#` comments. Subgraphs and undirected graphs are rejected.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{Error, Result};
pub use parser::{Edge, Graph, Node};
