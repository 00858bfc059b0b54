//! Go-syntax pretty-printing for the statement AST.
//!
//! One statement per line, tabs for indentation — close enough to gofmt that
//! diffs against hand-written expectations stay readable.

use std::fmt;

use crate::ast::{Expr, Stmt, UnaryOp};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::Int(v) => write!(f, "{v}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Binary { op, lhs, rhs } => {
                fmt_operand(lhs, f)?;
                write!(f, " {} ", op.symbol())?;
                fmt_operand(rhs, f)
            }
            Expr::Unary { op, expr } => {
                let UnaryOp::Not = op;
                write!(f, "!")?;
                fmt_operand(expr, f)
            }
        }
    }
}

/// Write a sub-expression, parenthesizing compound operands.
fn fmt_operand(e: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match e {
        Expr::Ident(_) | Expr::Int(_) | Expr::Bool(_) => write!(f, "{e}"),
        Expr::Binary { .. } | Expr::Unary { .. } => write!(f, "({e})"),
    }
}

/// Render a statement list at top level (no surrounding braces).
pub fn print_stmts(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in stmts {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

/// Render a full function declaration.
pub fn print_func(name: &str, stmts: &[Stmt]) -> String {
    let mut out = format!("func {name}() {{\n");
    for stmt in stmts {
        write_stmt(&mut out, stmt, 1);
    }
    out.push_str("}\n");
    out
}

fn write_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    let pad = "\t".repeat(indent);
    match stmt {
        Stmt::Assign {
            name,
            value,
            define,
        } => {
            let tok = if *define { ":=" } else { "=" };
            out.push_str(&format!("{pad}{name} {tok} {value}\n"));
        }
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            out.push_str(&format!("{pad}if {cond} {{\n"));
            for s in then_body {
                write_stmt(out, s, indent + 1);
            }
            match else_body {
                Some(body) => {
                    out.push_str(&format!("{pad}}} else {{\n"));
                    for s in body {
                        write_stmt(out, s, indent + 1);
                    }
                    out.push_str(&format!("{pad}}}\n"));
                }
                None => out.push_str(&format!("{pad}}}\n")),
            }
        }
        Stmt::For { cond, body } => {
            match cond {
                Some(cond) => out.push_str(&format!("{pad}for {cond} {{\n")),
                None => out.push_str(&format!("{pad}for {{\n")),
            }
            for s in body {
                write_stmt(out, s, indent + 1);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Stmt::Break => out.push_str(&format!("{pad}break\n")),
        Stmt::Return(None) => out.push_str(&format!("{pad}return\n")),
        Stmt::Return(Some(value)) => out.push_str(&format!("{pad}return {value}\n")),
        Stmt::Expr(expr) => out.push_str(&format!("{pad}{expr}\n")),
    }
}
