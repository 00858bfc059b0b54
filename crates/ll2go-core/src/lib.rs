//! Decompiler core: recovers structured Go control flow from LLVM IR.
//!
//! The front end hands over a per-function control flow graph plus the IR
//! basic blocks behind its nodes. This crate lifts each block's
//! instructions into statements ([`lift`]), then reduces the CFG by
//! repeatedly matching a fixed catalog of control flow primitives —
//! straight-line lists, if/if-else, pre-/post-test loops, if-return —
//! against it ([`iso`]), collapsing each occurrence into a single node
//! ([`merge`]) and synthesizing the equivalent structured statement
//! ([`restructure`]). A function whose graph reduces to one node comes out
//! as a statement body; anything the catalog cannot reduce is reported as
//! an unstructured graph.
//!
//! Known loss: the IR's signed/unsigned division, remainder and
//! shift-right forms collapse onto single Go operators. Recovering the
//! distinction takes a type-aware refinement pass that does not exist yet.

pub mod ast;
pub mod catalog;
pub mod decompile;
pub mod error;
pub mod graph;
pub mod ir;
pub mod iso;
pub mod lift;
pub mod lifted;
pub mod merge;
pub mod printer;
pub mod restructure;

pub use ast::{BinOp, Expr, Stmt, UnaryOp};
pub use catalog::{Catalog, Shape, SHAPE_NAMES};
pub use decompile::{DecompiledFunc, Decompiler};
pub use error::{CoreError, Result};
pub use graph::{Cfg, Edge, EdgeLabel};
pub use ir::{Incoming, Inst, IrBlock, Op, Opcode, Operand, Value};
pub use lifted::{LiftedBlock, Primitive, RawBlock};
pub use printer::{print_func, print_stmts};
