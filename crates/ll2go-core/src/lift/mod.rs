//! Basic-block lifting and φ-resolution.
//!
//! The block lifter turns an IR basic block into a `RawBlock`: every
//! instruction but the last becomes a statement, the last must be a
//! terminator and is retained as raw IR. Phi instructions become pending
//! entries instead of statements; `resolve_phis` then rewrites them as
//! plain assignments appended to the predecessor blocks they name.

pub mod inst;

use std::collections::BTreeMap;

pub use inst::{get_br_cond, lift_inst, operand_expr};

use crate::ast::Stmt;
use crate::error::{CoreError, Result};
use crate::ir::{IrBlock, Op};
use crate::lifted::{LiftedBlock, RawBlock};

/// Lift one IR basic block.
pub fn lift_block(block: &IrBlock) -> Result<RawBlock> {
    let Some((term, body)) = block.insts.split_last() else {
        return Err(CoreError::MalformedBlock {
            block: block.name.clone(),
            reason: "contains no instructions".to_string(),
        });
    };
    if !term.op.is_terminator() {
        return Err(CoreError::MalformedBlock {
            block: block.name.clone(),
            reason: format!("last instruction {} is not a terminator", term.op.opcode()),
        });
    }

    let mut stmts = Vec::with_capacity(body.len());
    let mut phis = Vec::new();
    for i in body {
        match &i.op {
            Op::Phi { incoming } => phis.push((inst::result_ident(i)?, incoming.clone())),
            _ => stmts.push(lift_inst(i)?),
        }
    }

    Ok(RawBlock {
        name: block.name.clone(),
        stmts,
        phis,
        term: term.clone(),
    })
}

/// Replace recorded phis with assignment statements in the predecessor
/// blocks they name. For `x = phi [v1, %p1], [v2, %p2]` this appends
/// `x = v1` to `p1` and `x = v2` to `p2` (plain assigns — the definition
/// site moves, so `:=` would be wrong).
pub fn resolve_phis(blocks: &mut BTreeMap<String, LiftedBlock>) -> Result<()> {
    // Collect first: blocks iterate in name order and phis in instruction
    // order, so placement is deterministic.
    let mut pending: Vec<(String, Stmt)> = Vec::new();
    for block in blocks.values() {
        let LiftedBlock::Raw(raw) = block else {
            continue;
        };
        for (ident, incoming) in &raw.phis {
            for inc in incoming {
                pending.push((
                    inc.pred.clone(),
                    Stmt::assign(ident.clone(), operand_expr(&inc.value)?),
                ));
            }
        }
    }

    for (pred, stmt) in pending {
        let Some(block) = blocks.get_mut(&pred) else {
            return Err(CoreError::MissingBlock(pred));
        };
        let mut stmts = block.stmts().to_vec();
        stmts.push(stmt);
        block.set_stmts(stmts);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Expr};
    use crate::ir::{Inst, Opcode, Operand};

    fn raw_map(blocks: Vec<RawBlock>) -> BTreeMap<String, LiftedBlock> {
        blocks
            .into_iter()
            .map(|b| (b.name.clone(), LiftedBlock::Raw(b)))
            .collect()
    }

    #[test]
    fn lift_splits_body_and_terminator() {
        let block = IrBlock::new(
            "entry",
            vec![
                Inst::binary(
                    "x",
                    Opcode::Add,
                    Operand::local("i32", "a"),
                    Operand::int("i32", 1),
                ),
                Inst::ret(Operand::local("i32", "x")),
            ],
        );
        let raw = lift_block(&block).unwrap();
        assert_eq!(raw.name, "entry");
        assert_eq!(raw.stmts.len(), 1);
        assert_eq!(raw.term, Inst::ret(Operand::local("i32", "x")));
    }

    #[test]
    fn lift_is_deterministic() {
        let block = IrBlock::new(
            "b",
            vec![
                Inst::icmp(
                    "t",
                    "slt",
                    Operand::local("i32", "i"),
                    Operand::int("i32", 10),
                ),
                Inst::cond_br(Operand::local("i1", "t"), "x", "y"),
            ],
        );
        let first = lift_block(&block).unwrap();
        for _ in 0..10 {
            let again = lift_block(&block).unwrap();
            assert_eq!(again.stmts, first.stmts);
            assert_eq!(again.term, first.term);
        }
    }

    #[test]
    fn empty_block_is_malformed() {
        let err = lift_block(&IrBlock::new("b", vec![])).unwrap_err();
        assert!(matches!(err, CoreError::MalformedBlock { block, .. } if block == "b"));
    }

    #[test]
    fn missing_terminator_is_malformed() {
        let block = IrBlock::new(
            "b",
            vec![Inst::binary(
                "x",
                Opcode::Add,
                Operand::int("i32", 1),
                Operand::int("i32", 2),
            )],
        );
        assert!(matches!(
            lift_block(&block),
            Err(CoreError::MalformedBlock { .. })
        ));
    }

    #[test]
    fn phis_are_recorded_not_lifted() {
        let block = IrBlock::new(
            "join",
            vec![
                Inst::phi(
                    "x",
                    vec![
                        ("left", Operand::int("i32", 1)),
                        ("right", Operand::local("i32", "y")),
                    ],
                ),
                Inst::ret_void(),
            ],
        );
        let raw = lift_block(&block).unwrap();
        assert!(raw.stmts.is_empty());
        assert_eq!(raw.phis.len(), 1);
        assert_eq!(raw.phis[0].0, "x");
    }

    #[test]
    fn resolve_phis_appends_assigns_to_predecessors() {
        let left = lift_block(&IrBlock::new("left", vec![Inst::br("join")])).unwrap();
        let right = lift_block(&IrBlock::new(
            "right",
            vec![
                Inst::binary(
                    "y",
                    Opcode::Mul,
                    Operand::local("i32", "a"),
                    Operand::int("i32", 2),
                ),
                Inst::br("join"),
            ],
        ))
        .unwrap();
        let join = lift_block(&IrBlock::new(
            "join",
            vec![
                Inst::phi(
                    "x",
                    vec![
                        ("left", Operand::int("i32", 1)),
                        ("right", Operand::local("i32", "y")),
                    ],
                ),
                Inst::ret_void(),
            ],
        ))
        .unwrap();

        let mut blocks = raw_map(vec![left, right, join]);
        resolve_phis(&mut blocks).unwrap();

        assert_eq!(
            blocks["left"].stmts(),
            &[Stmt::assign("x", Expr::Int(1))]
        );
        // The append lands after the block's own statements.
        assert_eq!(
            blocks["right"].stmts(),
            &[
                Stmt::define(
                    "y",
                    Expr::binary(BinOp::Mul, Expr::ident("a"), Expr::Int(2))
                ),
                Stmt::assign("x", Expr::ident("y")),
            ]
        );
        assert!(blocks["join"].stmts().is_empty());
    }

    #[test]
    fn resolve_phis_reports_unknown_predecessor() {
        let join = lift_block(&IrBlock::new(
            "join",
            vec![
                Inst::phi("x", vec![("ghost", Operand::int("i32", 1))]),
                Inst::ret_void(),
            ],
        ))
        .unwrap();
        let mut blocks = raw_map(vec![join]);
        assert!(matches!(
            resolve_phis(&mut blocks),
            Err(CoreError::MissingBlock(name)) if name == "ghost"
        ));
    }
}
