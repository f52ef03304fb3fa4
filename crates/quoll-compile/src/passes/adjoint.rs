//! Adjoint synthesis.
//!
//! The adjoint of a sequence `S1; S2; ...; Sn` is
//! `adjoint(Sn); ...; adjoint(S1)`. Each operation call is wrapped in
//! `Adjoint`, directly nested `Adjoint[Adjoint[..]]` pairs cancel, and the
//! top-level statements are reversed. A control scope produced by a lowered
//! quantum conditional is kept in place as a unit and only its body is
//! reversed, since its toggles conjugate the body.

use tracing::debug;

use quoll_ast::{Definition, DeriveMarkers, NodeId, Stmt, SyntaxTree};

use super::conditional::is_control_scope;
use super::{callee, calls_in, set_callee};
use crate::context::TranslationContext;
use crate::error::CompileResult;
use crate::functor::{cancel_adjoint_pairs, functor_chain, operation_name, wrap_adjoint};
use crate::naming::variant_base;

/// Derive the adjoint variant of `def` under a fresh name.
///
/// The original body is deep-copied first; `def` and the result never
/// share a node. Linking the two in the operation table is left to the
/// caller.
pub fn synthesize_adjoint(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    def: &Definition,
) -> CompileResult<Definition> {
    let body = tree.deep_copy_block(&def.body)?;
    let body = adjoint_block(tree, ctx, &body)?;
    let name = ctx.fresh_name(&variant_base(&def.name, "adj"));
    ctx.stats.adjoints_derived += 1;
    debug!("Derived adjoint {} of {}", name, def.name);
    Ok(Definition {
        name,
        params: def.params.clone(),
        body,
        operation: Some(DeriveMarkers::default()),
    })
}

/// Wrap every statement of `block` and return them in reverse order.
pub fn adjoint_block(
    tree: &mut SyntaxTree,
    ctx: &TranslationContext,
    block: &[NodeId],
) -> CompileResult<Vec<NodeId>> {
    for &stmt in block {
        adjoint_statement(tree, ctx, stmt)?;
    }
    Ok(block.iter().rev().copied().collect())
}

fn adjoint_statement(tree: &mut SyntaxTree, ctx: &TranslationContext, stmt: NodeId) -> CompileResult<()> {
    match tree.stmt(stmt)?.clone() {
        Stmt::Expr(expr) | Stmt::Assign { value: expr, .. } => wrap_calls(tree, ctx, expr),
        Stmt::With { context, body, .. } if is_control_scope(tree, &ctx.options, context)? => {
            let reversed = adjoint_block(tree, ctx, &body)?;
            if let Stmt::With { body, .. } = tree.stmt_mut(stmt)? {
                *body = reversed;
            }
            Ok(())
        }
        Stmt::With { body, .. } => {
            for nested in body {
                adjoint_statement(tree, ctx, nested)?;
            }
            Ok(())
        }
        Stmt::If { body, orelse, .. } => {
            for nested in body.into_iter().chain(orelse) {
                adjoint_statement(tree, ctx, nested)?;
            }
            Ok(())
        }
        Stmt::Def(_) | Stmt::Class { .. } | Stmt::Import { .. } | Stmt::Wire { .. } | Stmt::Pass => {
            Ok(())
        }
    }
}

/// Wrap each operation call of `expr` in `Adjoint`.
fn wrap_calls(tree: &mut SyntaxTree, ctx: &TranslationContext, expr: NodeId) -> CompileResult<()> {
    for call in calls_in(tree, expr)? {
        let func = callee(tree, call)?;
        let Some(name) = operation_name(tree, func)?.map(str::to_owned) else {
            continue;
        };
        if !ctx.operations.contains(&name) {
            continue;
        }
        let wrapped = wrap_adjoint(tree, func);
        let wrapped = cancel_adjoint_pairs(tree, wrapped)?;
        let (chain, _) = functor_chain(tree, wrapped)?;
        ctx.operations.require(&name, &chain)?;
        set_callee(tree, call, wrapped)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::options::TranslateOptions;
    use quoll_ast::Functor;

    fn bell(tree: &mut SyntaxTree) -> Definition {
        // H(c); Controlled[X]([c], q)
        let c = tree.name("c");
        let h = tree.call_named("H", vec![c]);
        let s1 = tree.expr_stmt(h);
        let x = tree.name("X");
        let cx = tree.functor(Functor::Controlled, x);
        let c = tree.name("c");
        let controls = tree.list(vec![c]);
        let q = tree.name("q");
        let call = tree.call(cx, vec![controls, q]);
        let s2 = tree.expr_stmt(call);
        Definition {
            name: "bell".into(),
            params: vec!["c".into(), "q".into()],
            body: vec![s1, s2],
            operation: Some(DeriveMarkers {
                adjoint: true,
                controlled: false,
            }),
        }
    }

    #[test]
    fn test_adjoint_reverses_and_wraps() {
        let mut tree = SyntaxTree::new();
        let def = bell(&mut tree);
        let mut ctx = TranslationContext::new(TranslateOptions::default());

        let adj = synthesize_adjoint(&mut tree, &mut ctx, &def).unwrap();
        assert_eq!(adj.name, "_bell_adj");
        assert_eq!(adj.params, def.params);
        assert_eq!(
            tree.render_block(&adj.body).unwrap(),
            vec!["Adjoint[Controlled[X]]([c], q)", "Adjoint[H](c)"]
        );
        assert!(!tree.shares_nodes(&def.body, &adj.body).unwrap());
        assert_eq!(tree.render_block(&def.body).unwrap()[0], "H(c)");
    }

    #[test]
    fn test_double_adjoint_cancels() {
        let mut tree = SyntaxTree::new();
        let def = bell(&mut tree);
        let mut ctx = TranslationContext::new(TranslateOptions::default());

        let adj = synthesize_adjoint(&mut tree, &mut ctx, &def).unwrap();
        let back = synthesize_adjoint(&mut tree, &mut ctx, &adj).unwrap();
        assert!(tree.same_blocks(&def.body, &back.body).unwrap());
    }

    #[test]
    fn test_classical_calls_are_untouched() {
        let mut tree = SyntaxTree::new();
        let q = tree.name("q");
        let call = tree.call_named("print", vec![q]);
        let stmt = tree.expr_stmt(call);
        let ctx = TranslationContext::new(TranslateOptions::default());

        let body = adjoint_block(&mut tree, &ctx, &[stmt]).unwrap();
        assert_eq!(tree.render_block(&body).unwrap(), vec!["print(q)"]);
    }

    #[test]
    fn test_missing_adjoint_is_reported() {
        let mut tree = SyntaxTree::new();
        let q = tree.name("q");
        let call = tree.call_named("prepare", vec![q]);
        let stmt = tree.expr_stmt(call);
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        ctx.operations.declare(
            "prepare",
            DeriveMarkers {
                adjoint: false,
                controlled: true,
            },
        );

        let err = adjoint_block(&mut tree, &ctx, &[stmt]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UndefinedVariant {
                functor: Functor::Adjoint,
                ..
            }
        ));
    }
}
