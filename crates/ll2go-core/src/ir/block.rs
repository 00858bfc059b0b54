use serde::{Deserialize, Serialize};

use super::inst::Inst;

/// An IR basic block as handed over by the front end: a name plus the
/// instruction sequence, terminator last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrBlock {
    pub name: String,
    pub insts: Vec<Inst>,
}

impl IrBlock {
    pub fn new(name: impl Into<String>, insts: Vec<Inst>) -> IrBlock {
        IrBlock {
            name: name.into(),
            insts,
        }
    }
}
