use std::fmt;

use serde::{Deserialize, Serialize};

/// LLVM IR instruction opcodes, as reported by the front end.
///
/// The full set is wider than what the lifter translates; opcodes outside the
/// supported subset surface as `UnsupportedOpcode` at lift time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    // Binary operations.
    Add,
    FAdd,
    Sub,
    FSub,
    Mul,
    FMul,
    UDiv,
    SDiv,
    FDiv,
    URem,
    SRem,
    FRem,
    // Bitwise operations.
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
    // Comparisons.
    ICmp,
    FCmp,
    // Terminators.
    Ret,
    Br,
    Switch,
    IndirectBr,
    Invoke,
    Unreachable,
    // Everything else the front end may surface.
    Alloca,
    Load,
    Store,
    GetElementPtr,
    Phi,
    Select,
    Call,
    Trunc,
    ZExt,
    SExt,
    FPTrunc,
    FPExt,
    FPToUI,
    FPToSI,
    UIToFP,
    SIToFP,
    PtrToInt,
    IntToPtr,
    BitCast,
    Resume,
    LandingPad,
}

impl Opcode {
    /// The LLVM assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::FAdd => "fadd",
            Opcode::Sub => "sub",
            Opcode::FSub => "fsub",
            Opcode::Mul => "mul",
            Opcode::FMul => "fmul",
            Opcode::UDiv => "udiv",
            Opcode::SDiv => "sdiv",
            Opcode::FDiv => "fdiv",
            Opcode::URem => "urem",
            Opcode::SRem => "srem",
            Opcode::FRem => "frem",
            Opcode::Shl => "shl",
            Opcode::LShr => "lshr",
            Opcode::AShr => "ashr",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::ICmp => "icmp",
            Opcode::FCmp => "fcmp",
            Opcode::Ret => "ret",
            Opcode::Br => "br",
            Opcode::Switch => "switch",
            Opcode::IndirectBr => "indirectbr",
            Opcode::Invoke => "invoke",
            Opcode::Unreachable => "unreachable",
            Opcode::Alloca => "alloca",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::GetElementPtr => "getelementptr",
            Opcode::Phi => "phi",
            Opcode::Select => "select",
            Opcode::Call => "call",
            Opcode::Trunc => "trunc",
            Opcode::ZExt => "zext",
            Opcode::SExt => "sext",
            Opcode::FPTrunc => "fptrunc",
            Opcode::FPExt => "fpext",
            Opcode::FPToUI => "fptoui",
            Opcode::FPToSI => "fptosi",
            Opcode::UIToFP => "uitofp",
            Opcode::SIToFP => "sitofp",
            Opcode::PtrToInt => "ptrtoint",
            Opcode::IntToPtr => "inttoptr",
            Opcode::BitCast => "bitcast",
            Opcode::Resume => "resume",
            Opcode::LandingPad => "landingpad",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// The value half of a `<type> <value>` operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer literal.
    Int(i64),
    /// `true` / `false` keyword.
    Bool(bool),
    /// Named local, e.g. `%foo` (sigil stripped).
    Local(String),
    /// Anonymous local, e.g. `%42`.
    Anon(u64),
}

/// A `<type> <value>` operand pair. The type is kept as its textual
/// spelling (`i32`, `double`, ...); the core never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    pub ty: String,
    pub value: Value,
}

impl Operand {
    pub fn int(ty: impl Into<String>, v: i64) -> Operand {
        Operand {
            ty: ty.into(),
            value: Value::Int(v),
        }
    }

    pub fn truth(v: bool) -> Operand {
        Operand {
            ty: "i1".to_string(),
            value: Value::Bool(v),
        }
    }

    pub fn local(ty: impl Into<String>, name: impl Into<String>) -> Operand {
        Operand {
            ty: ty.into(),
            value: Value::Local(name.into()),
        }
    }

    pub fn anon(ty: impl Into<String>, n: u64) -> Operand {
        Operand {
            ty: ty.into(),
            value: Value::Anon(n),
        }
    }
}

/// One incoming `[ value, %pred ]` pair of a `phi` instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incoming {
    pub pred: String,
    pub value: Operand,
}

/// An IR operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Two-operand arithmetic/bitwise instruction; `opcode` is one of the
    /// binary opcodes.
    Binary {
        opcode: Opcode,
        lhs: Operand,
        rhs: Operand,
    },
    /// Integer comparison. The predicate is kept as its textual mnemonic
    /// (`eq`, `slt`, ...).
    ICmp {
        pred: String,
        lhs: Operand,
        rhs: Operand,
    },
    /// Floating-point comparison (`oeq`, `ult`, ...).
    FCmp {
        pred: String,
        lhs: Operand,
        rhs: Operand,
    },
    /// SSA phi. Resolved into predecessor assignments before restructuring.
    Phi { incoming: Vec<Incoming> },
    /// Return with optional value.
    Ret(Option<Operand>),
    /// Unconditional branch.
    Br { dest: String },
    /// Two-way conditional branch.
    CondBr {
        cond: Operand,
        then_dest: String,
        else_dest: String,
    },
    /// Multi-way switch. Recognized as a terminator, never decoded.
    Switch {
        value: Operand,
        default_dest: String,
        cases: Vec<(Operand, String)>,
    },
    /// Indirect branch through a computed address.
    IndirectBr { dests: Vec<String> },
    /// Call with exceptional control flow.
    Invoke {
        normal_dest: String,
        unwind_dest: String,
    },
    /// Unreachable marker.
    Unreachable,
    /// Anything else the front end saw; always rejected by the lifter.
    Other(Opcode),
}

impl Op {
    /// The opcode of this operation.
    pub fn opcode(&self) -> Opcode {
        match self {
            Op::Binary { opcode, .. } => *opcode,
            Op::ICmp { .. } => Opcode::ICmp,
            Op::FCmp { .. } => Opcode::FCmp,
            Op::Phi { .. } => Opcode::Phi,
            Op::Ret(_) => Opcode::Ret,
            Op::Br { .. } | Op::CondBr { .. } => Opcode::Br,
            Op::Switch { .. } => Opcode::Switch,
            Op::IndirectBr { .. } => Opcode::IndirectBr,
            Op::Invoke { .. } => Opcode::Invoke,
            Op::Unreachable => Opcode::Unreachable,
            Op::Other(opcode) => *opcode,
        }
    }

    /// Whether this operation ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.opcode(),
            Opcode::Ret
                | Opcode::Br
                | Opcode::Switch
                | Opcode::IndirectBr
                | Opcode::Invoke
                | Opcode::Unreachable
        )
    }
}

/// An IR instruction: an operation plus the name of the value it defines,
/// if any. Anonymous results carry their decimal spelling (`%42` → `"42"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inst {
    pub result: Option<String>,
    pub op: Op,
}

impl Inst {
    pub fn binary(
        result: impl Into<String>,
        opcode: Opcode,
        lhs: Operand,
        rhs: Operand,
    ) -> Inst {
        Inst {
            result: Some(result.into()),
            op: Op::Binary { opcode, lhs, rhs },
        }
    }

    pub fn icmp(
        result: impl Into<String>,
        pred: impl Into<String>,
        lhs: Operand,
        rhs: Operand,
    ) -> Inst {
        Inst {
            result: Some(result.into()),
            op: Op::ICmp {
                pred: pred.into(),
                lhs,
                rhs,
            },
        }
    }

    pub fn fcmp(
        result: impl Into<String>,
        pred: impl Into<String>,
        lhs: Operand,
        rhs: Operand,
    ) -> Inst {
        Inst {
            result: Some(result.into()),
            op: Op::FCmp {
                pred: pred.into(),
                lhs,
                rhs,
            },
        }
    }

    pub fn phi(result: impl Into<String>, incoming: Vec<(&str, Operand)>) -> Inst {
        Inst {
            result: Some(result.into()),
            op: Op::Phi {
                incoming: incoming
                    .into_iter()
                    .map(|(pred, value)| Incoming {
                        pred: pred.to_string(),
                        value,
                    })
                    .collect(),
            },
        }
    }

    pub fn ret(value: Operand) -> Inst {
        Inst {
            result: None,
            op: Op::Ret(Some(value)),
        }
    }

    pub fn ret_void() -> Inst {
        Inst {
            result: None,
            op: Op::Ret(None),
        }
    }

    pub fn br(dest: impl Into<String>) -> Inst {
        Inst {
            result: None,
            op: Op::Br { dest: dest.into() },
        }
    }

    pub fn cond_br(cond: Operand, then_dest: impl Into<String>, else_dest: impl Into<String>) -> Inst {
        Inst {
            result: None,
            op: Op::CondBr {
                cond,
                then_dest: then_dest.into(),
                else_dest: else_dest.into(),
            },
        }
    }

    pub fn unreachable() -> Inst {
        Inst {
            result: None,
            op: Op::Unreachable,
        }
    }

    pub fn other(result: Option<&str>, opcode: Opcode) -> Inst {
        Inst {
            result: result.map(str::to_string),
            op: Op::Other(opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_classification() {
        assert!(Inst::ret_void().op.is_terminator());
        assert!(Inst::br("a").op.is_terminator());
        assert!(Inst::cond_br(Operand::truth(true), "a", "b").op.is_terminator());
        assert!(Inst::unreachable().op.is_terminator());
        assert!(!Inst::binary("x", Opcode::Add, Operand::int("i32", 1), Operand::int("i32", 2))
            .op
            .is_terminator());
        assert!(!Inst::phi("x", vec![]).op.is_terminator());
    }

    #[test]
    fn opcode_mnemonics() {
        assert_eq!(Opcode::GetElementPtr.to_string(), "getelementptr");
        assert_eq!(Opcode::ICmp.to_string(), "icmp");
        assert_eq!(Op::CondBr {
            cond: Operand::truth(true),
            then_dest: "a".to_string(),
            else_dest: "b".to_string(),
        }
        .opcode(),
        Opcode::Br);
    }
}
