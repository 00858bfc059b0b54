//! The per-function decompilation driver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::Stmt;
use crate::catalog::Catalog;
use crate::error::{CoreError, Result};
use crate::graph::Cfg;
use crate::lift;
use crate::lifted::LiftedBlock;
use crate::printer;
use crate::restructure;

/// A decompiled function: the name plus its reconstructed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompiledFunc {
    pub name: String,
    pub body: Vec<Stmt>,
}

impl DecompiledFunc {
    /// Render as a Go function declaration.
    pub fn to_go(&self) -> String {
        printer::print_func(&self.name, &self.body)
    }
}

/// Decompiler configuration: the immutable primitive catalog plus options,
/// threaded explicitly into every per-function call. All per-function state
/// lives inside [`Decompiler::decompile`] and is dropped when it returns.
#[derive(Debug, Clone)]
pub struct Decompiler {
    catalog: Catalog,
    debug: bool,
}

impl Decompiler {
    /// A decompiler using the built-in primitive catalog.
    pub fn new() -> Decompiler {
        Decompiler {
            catalog: Catalog::builtin(),
            debug: false,
        }
    }

    /// A decompiler using a host-loaded catalog.
    pub fn with_catalog(catalog: Catalog) -> Decompiler {
        Decompiler {
            catalog,
            debug: false,
        }
    }

    /// Report each located primitive and its node mapping on stderr.
    pub fn debug(mut self, enabled: bool) -> Decompiler {
        self.debug = enabled;
        self
    }

    /// Decompile one function from its CFG and basic blocks.
    ///
    /// Every CFG node must have a block of the same name. The blocks are
    /// lifted, phis resolved into predecessor assignments, and the CFG
    /// reduced primitive by primitive until the body falls out.
    pub fn decompile(
        &self,
        cfg: &Cfg,
        blocks: &BTreeMap<String, crate::ir::IrBlock>,
    ) -> Result<DecompiledFunc> {
        let mut lifted: BTreeMap<String, LiftedBlock> = BTreeMap::new();
        for node in cfg.nodes() {
            let block = blocks
                .get(node)
                .ok_or_else(|| CoreError::MissingBlock(node.to_string()))?;
            lifted.insert(node.to_string(), lift::lift_block(block)?.into());
        }

        lift::resolve_phis(&mut lifted)?;

        let mut work = cfg.clone();
        let body = restructure::restructure(&mut work, &mut lifted, &self.catalog, self.debug)?;
        Ok(DecompiledFunc {
            name: cfg.name().to_string(),
            body,
        })
    }
}

impl Default for Decompiler {
    fn default() -> Decompiler {
        Decompiler::new()
    }
}
