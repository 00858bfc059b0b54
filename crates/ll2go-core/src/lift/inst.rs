//! Instruction lifting: one IR instruction → one Go statement.
//!
//! A total function of its input with no state. Signed and unsigned
//! division/remainder (and the two shift-right forms) collapse onto single
//! Go operators; recovering the distinction needs the type-aware refinement
//! pass that is out of scope here.

use crate::ast::{BinOp, Expr, Stmt};
use crate::error::{CoreError, Result};
use crate::ir::{Inst, Op, Opcode, Operand, Value};

/// Lift one non-terminator, non-phi instruction into a statement.
pub fn lift_inst(inst: &Inst) -> Result<Stmt> {
    match &inst.op {
        Op::Binary { opcode, lhs, rhs } => {
            let op = binop_for(*opcode)?;
            let name = result_ident(inst)?;
            Ok(Stmt::define(
                name,
                Expr::binary(op, operand_expr(lhs)?, operand_expr(rhs)?),
            ))
        }
        Op::ICmp { pred, lhs, rhs } | Op::FCmp { pred, lhs, rhs } => {
            let op = cmp_for(pred)?;
            let name = result_ident(inst)?;
            Ok(Stmt::define(
                name,
                Expr::binary(op, operand_expr(lhs)?, operand_expr(rhs)?),
            ))
        }
        other => Err(CoreError::UnsupportedOpcode(other.opcode())),
    }
}

/// Decode a two-way branch terminator into its condition expression and
/// true/false target names. A literal `0`/`1` condition becomes the boolean
/// `false`/`true`.
pub fn get_br_cond(term: &Inst) -> Result<(Expr, &str, &str)> {
    match &term.op {
        Op::CondBr {
            cond,
            then_dest,
            else_dest,
        } => {
            let expr = match &cond.value {
                Value::Int(0) => Expr::Bool(false),
                Value::Int(1) => Expr::Bool(true),
                _ => operand_expr(cond)?,
            };
            Ok((expr, then_dest, else_dest))
        }
        other => Err(CoreError::BranchShapeMismatch(format!(
            "expected a two-way branch terminator, found {}",
            other.opcode()
        ))),
    }
}

/// Decode an operand into an expression.
pub fn operand_expr(operand: &Operand) -> Result<Expr> {
    match &operand.value {
        Value::Int(v) => Ok(Expr::Int(*v)),
        Value::Bool(b) => Ok(Expr::Bool(*b)),
        Value::Local(name) => Ok(Expr::Ident(ident_for(name)?)),
        Value::Anon(n) => Ok(Expr::Ident(format!("_{n}"))),
    }
}

/// The identifier defined by a value-producing instruction.
pub(crate) fn result_ident(inst: &Inst) -> Result<String> {
    let name = inst
        .result
        .as_deref()
        .ok_or_else(|| CoreError::MissingResult(inst.op.opcode()))?;
    ident_for(name)
}

/// Map an IR local name onto a lexically valid Go identifier.
///
/// Anonymous locals (`%42`, surfaced as all-digit names) are prefixed with
/// an underscore; the rename is bijective because `_<digit>…` source names
/// are reserved and rejected.
fn ident_for(name: &str) -> Result<String> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(format!("_{name}"));
    }
    let mut bytes = name.bytes();
    if bytes.next() == Some(b'_') && bytes.next().is_some_and(|b| b.is_ascii_digit()) {
        return Err(CoreError::ReservedLocal(name.to_string()));
    }
    Ok(name.to_string())
}

fn binop_for(opcode: Opcode) -> Result<BinOp> {
    match opcode {
        Opcode::Add | Opcode::FAdd => Ok(BinOp::Add),
        Opcode::Sub | Opcode::FSub => Ok(BinOp::Sub),
        Opcode::Mul | Opcode::FMul => Ok(BinOp::Mul),
        Opcode::UDiv | Opcode::SDiv | Opcode::FDiv => Ok(BinOp::Div),
        Opcode::URem | Opcode::SRem | Opcode::FRem => Ok(BinOp::Rem),
        Opcode::And => Ok(BinOp::And),
        Opcode::Or => Ok(BinOp::Or),
        Opcode::Xor => Ok(BinOp::Xor),
        Opcode::Shl => Ok(BinOp::Shl),
        Opcode::LShr | Opcode::AShr => Ok(BinOp::Shr),
        other => Err(CoreError::UnsupportedOpcode(other)),
    }
}

/// Comparison operator for an `icmp`/`fcmp` predicate mnemonic. The
/// NaN-only predicates (`ord`, `uno`) have no Go counterpart.
fn cmp_for(pred: &str) -> Result<BinOp> {
    match pred {
        "eq" | "ueq" | "oeq" => Ok(BinOp::Eq),
        "ne" | "une" | "one" => Ok(BinOp::Ne),
        "ugt" | "sgt" | "ogt" => Ok(BinOp::Gt),
        "uge" | "sge" | "oge" => Ok(BinOp::Ge),
        "ult" | "slt" | "olt" => Ok(BinOp::Lt),
        "ule" | "sle" | "ole" => Ok(BinOp::Le),
        other => Err(CoreError::UnsupportedPredicate(other.to_string())),
    }
}
