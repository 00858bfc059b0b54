//! Go-level AST for reconstructed function bodies.
//!
//! Deliberately minimal: the restructurer only ever synthesizes assignments,
//! if/else, condition-or-bare `for` loops, `break`, `return` and expression
//! statements. Block-to-block transfer never appears here — control flow is
//! expressed purely through statement structure.

use serde::{Deserialize, Serialize};

/// Binary operators, comparisons included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Go source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Named variable reference.
    Ident(String),
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
    /// `lhs op rhs`
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `op expr`
    Unary { op: UnaryOp, expr: Box<Expr> },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Ident(name.into())
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Logical negation. `!!e` collapses back to `e`.
    pub fn not(expr: Expr) -> Expr {
        match expr {
            Expr::Unary {
                op: UnaryOp::Not,
                expr,
            } => *expr,
            Expr::Bool(b) => Expr::Bool(!b),
            other => Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(other),
            },
        }
    }

    /// Whether the expression reads the identifier `name`.
    pub fn uses_ident(&self, name: &str) -> bool {
        match self {
            Expr::Ident(id) => id == name,
            Expr::Int(_) | Expr::Bool(_) => false,
            Expr::Binary { lhs, rhs, .. } => lhs.uses_ident(name) || rhs.uses_ident(name),
            Expr::Unary { expr, .. } => expr.uses_ident(name),
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `name := value` when `define`, `name = value` otherwise.
    /// φ-elimination emits the plain-assign form.
    Assign {
        name: String,
        value: Expr,
        define: bool,
    },
    /// If/else. `else_body` of `None` prints no else branch.
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    /// `for cond { body }`, or `for { body }` when `cond` is `None`.
    For { cond: Option<Expr>, body: Vec<Stmt> },
    /// `break`
    Break,
    /// `return` with optional value.
    Return(Option<Expr>),
    /// Bare expression statement.
    Expr(Expr),
}

impl Stmt {
    pub fn define(name: impl Into<String>, value: Expr) -> Stmt {
        Stmt::Assign {
            name: name.into(),
            value,
            define: true,
        }
    }

    pub fn assign(name: impl Into<String>, value: Expr) -> Stmt {
        Stmt::Assign {
            name: name.into(),
            value,
            define: false,
        }
    }

    /// Whether the statement (or anything nested in it) reads `name`.
    /// Writes count too: a later redefinition still pins the identifier.
    pub fn uses_ident(&self, name: &str) -> bool {
        match self {
            Stmt::Assign {
                name: target,
                value,
                ..
            } => target == name || value.uses_ident(name),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                cond.uses_ident(name)
                    || then_body.iter().any(|s| s.uses_ident(name))
                    || else_body
                        .as_ref()
                        .is_some_and(|body| body.iter().any(|s| s.uses_ident(name)))
            }
            Stmt::For { cond, body } => {
                cond.as_ref().is_some_and(|c| c.uses_ident(name))
                    || body.iter().any(|s| s.uses_ident(name))
            }
            Stmt::Break => false,
            Stmt::Return(value) => value.as_ref().is_some_and(|e| e.uses_ident(name)),
            Stmt::Expr(expr) => expr.uses_ident(name),
        }
    }
}
