//! Control flow restructuring.
//!
//! Repeatedly locates an isomorphism of a catalog shape in the function's
//! CFG, collapses the matched nodes into one node (named after the matched
//! entry), and installs a synthesized primitive under that name. Every
//! collapse removes at least one node, so the loop runs at most `n − 1`
//! times before either a single node remains — its statements are the
//! function body — or no shape matches and the graph is reported as
//! unstructured.

use std::collections::BTreeMap;

use crate::ast::{Expr, Stmt};
use crate::catalog::{Catalog, Shape};
use crate::error::{CoreError, Result};
use crate::graph::Cfg;
use crate::iso;
use crate::lift::{get_br_cond, operand_expr};
use crate::lifted::{LiftedBlock, Primitive};
use crate::merge;
use crate::ir::{Inst, Op, Operand};

/// Reduce the CFG to a single node, producing the function body.
pub fn restructure(
    cfg: &mut Cfg,
    blocks: &mut BTreeMap<String, LiftedBlock>,
    catalog: &Catalog,
    debug: bool,
) -> Result<Vec<Stmt>> {
    while cfg.len() > 1 {
        let Some((shape, mapping)) = locate(cfg, catalog) else {
            return Err(CoreError::UnstructuredGraph {
                nodes: cfg.nodes().map(str::to_string).collect(),
                last_shape: catalog
                    .shapes()
                    .last()
                    .map(|s| s.name().to_string())
                    .unwrap_or_default(),
            });
        };
        if debug {
            report_match(cfg, shape, &mapping);
        }

        let new_name = merge::merge(cfg, &mapping, shape);

        let mut members = BTreeMap::new();
        for gname in mapping.values() {
            let block = blocks
                .remove(gname)
                .ok_or_else(|| CoreError::MissingBlock(gname.clone()))?;
            members.insert(gname.clone(), block);
        }

        let prim = synthesize(shape, &mapping, members, &new_name)?;
        blocks.insert(new_name, LiftedBlock::Prim(prim));
    }
    finalize(cfg, blocks)
}

/// First catalog shape (in priority order) with a match.
fn locate<'a>(cfg: &Cfg, catalog: &'a Catalog) -> Option<(&'a Shape, BTreeMap<String, String>)> {
    for shape in catalog.shapes() {
        if let Some(mapping) = iso::search(cfg, shape) {
            return Some((shape, mapping));
        }
    }
    None
}

fn report_match(cfg: &Cfg, shape: &Shape, mapping: &BTreeMap<String, String>) {
    let entry = mapping
        .get(shape.entry())
        .map(String::as_str)
        .unwrap_or("?");
    let pairs: Vec<String> = mapping.iter().map(|(s, g)| format!("{s}={g:?}")).collect();
    eprintln!(
        "{}: isomorphism of {:?} at node {entry:?}: {}",
        cfg.name(),
        shape.name(),
        pairs.join(", ")
    );
}

/// The surviving block yields the body. A trailing `ret` becomes a return
/// statement; any other leftover terminator means the reduction went wrong.
fn finalize(cfg: &Cfg, blocks: &mut BTreeMap<String, LiftedBlock>) -> Result<Vec<Stmt>> {
    let Some(name) = cfg.nodes().next().map(str::to_string) else {
        return Err(CoreError::EmptyGraph {
            graph: cfg.name().to_string(),
        });
    };
    let block = blocks
        .remove(&name)
        .ok_or_else(|| CoreError::MissingBlock(name.clone()))?;
    let (mut stmts, term) = block.into_parts();
    match term {
        None => Ok(stmts),
        Some(Inst {
            op: Op::Ret(value), ..
        }) => {
            stmts.push(return_stmt(value)?);
            Ok(stmts)
        }
        Some(_) => Err(CoreError::TrailingTerminator(name)),
    }
}

fn return_stmt(value: Option<Operand>) -> Result<Stmt> {
    Ok(Stmt::Return(
        value.as_ref().map(operand_expr).transpose()?,
    ))
}

// -------------------------------------------------------------------------
// Statement synthesis
// -------------------------------------------------------------------------

/// Build the primitive for a collapsed shape occurrence. Member blocks are
/// addressed by their shape role; the primitive's terminator is the exit
/// member's (for `if_return`, the fall-through's — the return arm has been
/// consumed).
fn synthesize(
    shape: &Shape,
    mapping: &BTreeMap<String, String>,
    mut members: BTreeMap<String, LiftedBlock>,
    new_name: &str,
) -> Result<Primitive> {
    let members = &mut members;
    match shape.name() {
        "list" => synth_list(members, mapping, new_name),
        "if" => synth_if(members, mapping, new_name),
        "if_else" => synth_if_else(members, mapping, new_name),
        "pre_loop" => synth_pre_loop(members, mapping, new_name),
        "post_loop" => synth_post_loop(members, mapping, new_name),
        "if_return" => synth_if_return(members, mapping, new_name),
        other => Err(CoreError::UnsupportedShape(other.to_string())),
    }
}

/// Take the member block playing `role`.
fn member(
    members: &mut BTreeMap<String, LiftedBlock>,
    mapping: &BTreeMap<String, String>,
    role: &str,
) -> Result<LiftedBlock> {
    let name = mapping
        .get(role)
        .ok_or_else(|| CoreError::MissingBlock(role.to_string()))?;
    members
        .remove(name)
        .ok_or_else(|| CoreError::MissingBlock(name.clone()))
}

fn term_of(block: &LiftedBlock) -> Result<&Inst> {
    block.term().ok_or_else(|| CoreError::MalformedBlock {
        block: block.name().to_string(),
        reason: "has no terminator".to_string(),
    })
}

/// `A; B`
fn synth_list(
    members: &mut BTreeMap<String, LiftedBlock>,
    mapping: &BTreeMap<String, String>,
    new_name: &str,
) -> Result<Primitive> {
    let a = member(members, mapping, "A")?;
    let b = member(members, mapping, "B")?;

    let (mut stmts, _) = a.into_parts();
    let (b_stmts, term) = b.into_parts();
    stmts.extend(b_stmts);
    Ok(Primitive {
        name: new_name.to_string(),
        stmts,
        term,
    })
}

/// `A; if A_cond { B }; C`
fn synth_if(
    members: &mut BTreeMap<String, LiftedBlock>,
    mapping: &BTreeMap<String, String>,
    new_name: &str,
) -> Result<Primitive> {
    let a = member(members, mapping, "A")?;
    let b = member(members, mapping, "B")?;
    let c = member(members, mapping, "C")?;

    let (cond, t, f) = get_br_cond(term_of(&a)?)?;
    if t != b.name() || f != c.name() {
        return Err(CoreError::BranchShapeMismatch(format!(
            "branch targets true={t:?}, false={f:?} do not match body {:?} and exit {:?}",
            b.name(),
            c.name()
        )));
    }

    let (mut stmts, _) = a.into_parts();
    let (then_body, _) = b.into_parts();
    let (c_stmts, term) = c.into_parts();
    stmts.push(Stmt::If {
        cond,
        then_body,
        else_body: None,
    });
    stmts.extend(c_stmts);
    Ok(Primitive {
        name: new_name.to_string(),
        stmts,
        term,
    })
}

/// `A; if A_cond { B } else { C }; D`
///
/// The body nodes are indistinguishable at the graph level, so the match
/// may have them swapped relative to the branch; the terminator's targets
/// decide which block is the then-branch.
fn synth_if_else(
    members: &mut BTreeMap<String, LiftedBlock>,
    mapping: &BTreeMap<String, String>,
    new_name: &str,
) -> Result<Primitive> {
    let a = member(members, mapping, "A")?;
    let b = member(members, mapping, "B")?;
    let c = member(members, mapping, "C")?;
    let d = member(members, mapping, "D")?;

    let (cond, t, f) = get_br_cond(term_of(&a)?)?;
    let (then_blk, else_blk) = if t == b.name() && f == c.name() {
        (b, c)
    } else if t == c.name() && f == b.name() {
        (c, b)
    } else {
        return Err(CoreError::BranchShapeMismatch(format!(
            "branch targets true={t:?}, false={f:?} do not match bodies {:?} and {:?}",
            b.name(),
            c.name()
        )));
    };

    let (mut stmts, _) = a.into_parts();
    let (then_body, _) = then_blk.into_parts();
    let (else_body, _) = else_blk.into_parts();
    let (d_stmts, term) = d.into_parts();
    stmts.push(Stmt::If {
        cond,
        then_body,
        else_body: Some(else_body),
    });
    stmts.extend(d_stmts);
    Ok(Primitive {
        name: new_name.to_string(),
        stmts,
        term,
    })
}

/// `for A_cond { B }; C` — or, when the header keeps live statements,
/// `for { A; if !A_cond { break }; B }; C`.
fn synth_pre_loop(
    members: &mut BTreeMap<String, LiftedBlock>,
    mapping: &BTreeMap<String, String>,
    new_name: &str,
) -> Result<Primitive> {
    let a = member(members, mapping, "A")?;
    let b = member(members, mapping, "B")?;
    let c = member(members, mapping, "C")?;

    // Decode before expansion: expanding removes the condition's defining
    // statement from the header, which is exactly what makes the
    // empty-header test below well-defined.
    let (cond, _, _) = get_br_cond(term_of(&a)?)?;
    let (mut a_stmts, _) = a.into_parts();
    let cond = expand(&mut a_stmts, cond);

    let (b_stmts, _) = b.into_parts();
    let (c_stmts, term) = c.into_parts();

    let mut stmts = Vec::new();
    if a_stmts.is_empty() {
        stmts.push(Stmt::For {
            cond: Some(cond),
            body: b_stmts,
        });
    } else {
        let mut body = a_stmts;
        body.push(break_unless(cond));
        body.extend(b_stmts);
        stmts.push(Stmt::For { cond: None, body });
    }
    stmts.extend(c_stmts);
    Ok(Primitive {
        name: new_name.to_string(),
        stmts,
        term,
    })
}

/// `for { A; if !A_cond { break } }; B`
fn synth_post_loop(
    members: &mut BTreeMap<String, LiftedBlock>,
    mapping: &BTreeMap<String, String>,
    new_name: &str,
) -> Result<Primitive> {
    let a = member(members, mapping, "A")?;
    let b = member(members, mapping, "B")?;

    let (cond, _, _) = get_br_cond(term_of(&a)?)?;
    let (mut body, _) = a.into_parts();
    body.push(break_unless(cond));

    let (b_stmts, term) = b.into_parts();
    let mut stmts = vec![Stmt::For { cond: None, body }];
    stmts.extend(b_stmts);
    Ok(Primitive {
        name: new_name.to_string(),
        stmts,
        term,
    })
}

/// `A; if A_cond { B; return ... }; C`
///
/// The return arm vanishes from the graph, so the primitive keeps the
/// fall-through's terminator. The branch polarity is recovered from the
/// terminator: when the return arm sits on the false edge the condition is
/// negated.
fn synth_if_return(
    members: &mut BTreeMap<String, LiftedBlock>,
    mapping: &BTreeMap<String, String>,
    new_name: &str,
) -> Result<Primitive> {
    let a = member(members, mapping, "A")?;
    let b = member(members, mapping, "B")?;
    let c = member(members, mapping, "C")?;

    let (cond, t, f) = get_br_cond(term_of(&a)?)?;
    let cond = if t == b.name() {
        cond
    } else if f == b.name() {
        Expr::not(cond)
    } else {
        return Err(CoreError::BranchShapeMismatch(format!(
            "branch targets true={t:?}, false={f:?} do not include the return arm {:?}",
            b.name()
        )));
    };

    let b_name = b.name().to_string();
    let (mut then_body, b_term) = b.into_parts();
    match b_term.map(|t| t.op) {
        Some(Op::Ret(value)) => then_body.push(return_stmt(value)?),
        _ => {
            return Err(CoreError::BranchShapeMismatch(format!(
                "return arm {b_name:?} does not end in ret"
            )))
        }
    }

    let (mut stmts, _) = a.into_parts();
    let (c_stmts, term) = c.into_parts();
    stmts.push(Stmt::If {
        cond,
        then_body,
        else_body: None,
    });
    stmts.extend(c_stmts);
    Ok(Primitive {
        name: new_name.to_string(),
        stmts,
        term,
    })
}

fn break_unless(cond: Expr) -> Stmt {
    Stmt::If {
        cond: Expr::not(cond),
        then_body: vec![Stmt::Break],
        else_body: None,
    }
}

// -------------------------------------------------------------------------
// Expression expansion
// -------------------------------------------------------------------------

/// Fold a computed condition back into a loop/if header.
///
/// When `cond` is a bare identifier defined by the last `t := rhs` in
/// `stmts` and unused afterwards, the define is removed and `rhs` returned;
/// otherwise `cond` comes back unchanged.
fn expand(stmts: &mut Vec<Stmt>, cond: Expr) -> Expr {
    let Expr::Ident(t) = &cond else {
        return cond;
    };
    let Some(i) = stmts.iter().rposition(
        |s| matches!(s, Stmt::Assign { name, define: true, .. } if name == t),
    ) else {
        return cond;
    };
    if stmts[i + 1..].iter().any(|s| s.uses_ident(t)) {
        return cond;
    }
    match stmts.remove(i) {
        Stmt::Assign { value, .. } => value,
        other => {
            stmts.insert(i, other);
            cond
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use crate::catalog::Catalog;
    use crate::lifted::RawBlock;

    fn raw(name: &str, stmts: Vec<Stmt>, term: Inst) -> LiftedBlock {
        LiftedBlock::Raw(RawBlock {
            name: name.to_string(),
            stmts,
            phis: Vec::new(),
            term,
        })
    }

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|&(s, g)| (s.to_string(), g.to_string()))
            .collect()
    }

    fn members(blocks: Vec<LiftedBlock>) -> BTreeMap<String, LiftedBlock> {
        blocks
            .into_iter()
            .map(|b| (b.name().to_string(), b))
            .collect()
    }

    fn shape<'a>(catalog: &'a Catalog, name: &str) -> &'a Shape {
        catalog
            .shapes()
            .iter()
            .find(|s| s.name() == name)
            .unwrap()
    }

    fn lt_i_10() -> Expr {
        Expr::binary(BinOp::Lt, Expr::ident("i"), Expr::Int(10))
    }

    #[test]
    fn expand_folds_last_define() {
        let mut stmts = vec![Stmt::define("t", lt_i_10())];
        let cond = expand(&mut stmts, Expr::ident("t"));
        assert_eq!(cond, lt_i_10());
        assert!(stmts.is_empty());
    }

    #[test]
    fn expand_keeps_condition_with_later_use() {
        let mut stmts = vec![
            Stmt::define("t", lt_i_10()),
            Stmt::assign("u", Expr::ident("t")),
        ];
        let cond = expand(&mut stmts, Expr::ident("t"));
        assert_eq!(cond, Expr::ident("t"));
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn expand_ignores_plain_assigns() {
        // `t = e` is a φ-placed assign, not the defining statement.
        let mut stmts = vec![Stmt::assign("t", lt_i_10())];
        let cond = expand(&mut stmts, Expr::ident("t"));
        assert_eq!(cond, Expr::ident("t"));
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn expand_leaves_non_identifier_conditions() {
        let mut stmts = vec![Stmt::define("t", lt_i_10())];
        let cond = expand(&mut stmts, Expr::Bool(true));
        assert_eq!(cond, Expr::Bool(true));
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn if_else_swaps_bodies_to_follow_the_terminator() {
        // The matcher assigned B=n1, C=n2 but the branch's true target is n2.
        let catalog = Catalog::builtin();
        let m = mapping(&[("A", "n0"), ("B", "n1"), ("C", "n2"), ("D", "n3")]);
        let blocks = members(vec![
            raw("n0", vec![], Inst::cond_br(Operand::local("i1", "c"), "n2", "n1")),
            raw("n1", vec![Stmt::define("e", Expr::Int(1))], Inst::br("n3")),
            raw("n2", vec![Stmt::define("f", Expr::Int(2))], Inst::br("n3")),
            raw("n3", vec![], Inst::ret_void()),
        ]);

        let prim = synthesize(shape(&catalog, "if_else"), &m, blocks, "if_else_0").unwrap();
        let Stmt::If {
            then_body,
            else_body,
            ..
        } = &prim.stmts[0]
        else {
            panic!("expected if statement, got {:?}", prim.stmts[0]);
        };
        assert_eq!(then_body[0], Stmt::define("f", Expr::Int(2)));
        assert_eq!(
            else_body.as_ref().unwrap()[0],
            Stmt::define("e", Expr::Int(1))
        );
    }

    #[test]
    fn if_else_rejects_foreign_targets() {
        let catalog = Catalog::builtin();
        let m = mapping(&[("A", "n0"), ("B", "n1"), ("C", "n2"), ("D", "n3")]);
        let blocks = members(vec![
            raw("n0", vec![], Inst::cond_br(Operand::local("i1", "c"), "x", "y")),
            raw("n1", vec![], Inst::br("n3")),
            raw("n2", vec![], Inst::br("n3")),
            raw("n3", vec![], Inst::ret_void()),
        ]);
        assert!(matches!(
            synthesize(shape(&catalog, "if_else"), &m, blocks, "if_else_0"),
            Err(CoreError::BranchShapeMismatch(_))
        ));
    }

    #[test]
    fn if_requires_exact_target_names() {
        let catalog = Catalog::builtin();
        let m = mapping(&[("A", "n0"), ("B", "n1"), ("C", "n2")]);
        // true/false targets swapped relative to the matched roles.
        let blocks = members(vec![
            raw("n0", vec![], Inst::cond_br(Operand::local("i1", "c"), "n2", "n1")),
            raw("n1", vec![], Inst::br("n2")),
            raw("n2", vec![], Inst::ret_void()),
        ]);
        assert!(matches!(
            synthesize(shape(&catalog, "if"), &m, blocks, "if_0"),
            Err(CoreError::BranchShapeMismatch(_))
        ));
    }

    #[test]
    fn if_return_negates_when_return_arm_is_false_target() {
        let catalog = Catalog::builtin();
        let m = mapping(&[("A", "n0"), ("B", "n1"), ("C", "n2")]);
        let blocks = members(vec![
            raw("n0", vec![], Inst::cond_br(Operand::local("i1", "c"), "n2", "n1")),
            raw("n1", vec![], Inst::ret(Operand::int("i32", 0))),
            raw("n2", vec![], Inst::ret(Operand::int("i32", 1))),
        ]);

        let prim = synthesize(shape(&catalog, "if_return"), &m, blocks, "if_return_0").unwrap();
        let Stmt::If {
            cond, then_body, ..
        } = &prim.stmts[0]
        else {
            panic!("expected if statement");
        };
        assert_eq!(*cond, Expr::not(Expr::ident("c")));
        assert_eq!(then_body.last(), Some(&Stmt::Return(Some(Expr::Int(0)))));
        // The exit member's terminator survives on the primitive.
        assert_eq!(
            prim.term,
            Some(Inst::ret(Operand::int("i32", 1)))
        );
    }

    #[test]
    fn if_return_requires_a_ret_arm() {
        let catalog = Catalog::builtin();
        let m = mapping(&[("A", "n0"), ("B", "n1"), ("C", "n2")]);
        let blocks = members(vec![
            raw("n0", vec![], Inst::cond_br(Operand::local("i1", "c"), "n1", "n2")),
            raw("n1", vec![], Inst::unreachable()),
            raw("n2", vec![], Inst::ret_void()),
        ]);
        assert!(matches!(
            synthesize(shape(&catalog, "if_return"), &m, blocks, "if_return_0"),
            Err(CoreError::BranchShapeMismatch(_))
        ));
    }
}
