//! Lifted basic blocks: the unit the restructurer works on.
//!
//! A lifted block is conceptually a basic block whose body has been
//! translated to statements while its terminator is still raw IR. Two
//! variants share that contract: `Raw` blocks come straight from the block
//! lifter, `Prim` blocks are synthesized when a control flow primitive
//! collapses — a primitive may itself be consumed by a later collapse, so it
//! behaves as a block too.

use serde::{Deserialize, Serialize};

use crate::ast::Stmt;
use crate::ir::{Incoming, Inst};

/// A basic block lifted from IR. `phis` holds the block's phi instructions
/// (result identifier plus incoming pairs) for later φ-resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBlock {
    pub name: String,
    pub stmts: Vec<Stmt>,
    pub phis: Vec<(String, Vec<Incoming>)>,
    pub term: Inst,
}

/// A collapsed control flow primitive. Its terminator is the exit member's
/// terminator, or `None` once the function's return has been consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primitive {
    pub name: String,
    pub stmts: Vec<Stmt>,
    pub term: Option<Inst>,
}

/// Either kind of lifted block, exposing the shared capability set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LiftedBlock {
    Raw(RawBlock),
    Prim(Primitive),
}

impl LiftedBlock {
    pub fn name(&self) -> &str {
        match self {
            LiftedBlock::Raw(b) => &b.name,
            LiftedBlock::Prim(p) => &p.name,
        }
    }

    pub fn stmts(&self) -> &[Stmt] {
        match self {
            LiftedBlock::Raw(b) => &b.stmts,
            LiftedBlock::Prim(p) => &p.stmts,
        }
    }

    /// Replace the statement list. Used by φ-resolution only.
    pub fn set_stmts(&mut self, stmts: Vec<Stmt>) {
        match self {
            LiftedBlock::Raw(b) => b.stmts = stmts,
            LiftedBlock::Prim(p) => p.stmts = stmts,
        }
    }

    pub fn term(&self) -> Option<&Inst> {
        match self {
            LiftedBlock::Raw(b) => Some(&b.term),
            LiftedBlock::Prim(p) => p.term.as_ref(),
        }
    }

    /// Consume the block into its statements and terminator.
    pub fn into_parts(self) -> (Vec<Stmt>, Option<Inst>) {
        match self {
            LiftedBlock::Raw(b) => (b.stmts, Some(b.term)),
            LiftedBlock::Prim(p) => (p.stmts, p.term),
        }
    }
}

impl From<RawBlock> for LiftedBlock {
    fn from(b: RawBlock) -> LiftedBlock {
        LiftedBlock::Raw(b)
    }
}

impl From<Primitive> for LiftedBlock {
    fn from(p: Primitive) -> LiftedBlock {
        LiftedBlock::Prim(p)
    }
}
