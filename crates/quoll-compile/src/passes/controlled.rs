//! Controlled synthesis.
//!
//! Control distributes over sequential composition, so statement order is
//! kept. Calls that already take a control argument have that argument
//! extended instead of being wrapped a second time; a derived controlled
//! operation therefore never carries nested `Controlled` wrappers.

use tracing::debug;

use quoll_ast::{Definition, DeriveMarkers, Expr, NodeId, Stmt, SyntaxTree};

use super::{callee, calls_in, set_callee};
use crate::context::TranslationContext;
use crate::error::{CompileError, CompileResult};
use crate::functor::{
    Signature, classify_functor_signature, functor_chain, merge_control, operation_name,
    wrap_controlled,
};
use crate::naming::variant_base;
use crate::table::OperationTable;

/// Rewrites operation calls so they only act when `control` is all ones.
#[derive(Debug, Clone)]
pub struct ControlLifter {
    control: String,
}

impl ControlLifter {
    /// Lifter threading the control line reference `control`.
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
        }
    }

    /// Name of the control reference.
    pub fn control(&self) -> &str {
        &self.control
    }

    /// Lift every statement of `block` in place.
    ///
    /// Nested scoped blocks and conditionals are lifted too; nested
    /// definitions and classes are not, they are separate operations.
    pub fn lift_block(
        &self,
        tree: &mut SyntaxTree,
        operations: &OperationTable,
        block: &[NodeId],
    ) -> CompileResult<()> {
        for &stmt in block {
            match tree.stmt(stmt)?.clone() {
                Stmt::Expr(expr) | Stmt::Assign { value: expr, .. } => {
                    self.lift_calls(tree, operations, expr)?;
                }
                Stmt::With { body, .. } => self.lift_block(tree, operations, &body)?,
                Stmt::If { body, orelse, .. } => {
                    self.lift_block(tree, operations, &body)?;
                    self.lift_block(tree, operations, &orelse)?;
                }
                Stmt::Def(_)
                | Stmt::Class { .. }
                | Stmt::Import { .. }
                | Stmt::Wire { .. }
                | Stmt::Pass => {}
            }
        }
        Ok(())
    }

    fn lift_calls(
        &self,
        tree: &mut SyntaxTree,
        operations: &OperationTable,
        expr: NodeId,
    ) -> CompileResult<()> {
        for call in calls_in(tree, expr)? {
            let func = callee(tree, call)?;
            let Some(name) = operation_name(tree, func)?.map(str::to_owned) else {
                continue;
            };
            if !operations.contains(&name) {
                continue;
            }
            match classify_functor_signature(tree, func)? {
                Signature::Identity => {
                    let wrapped = wrap_controlled(tree, func);
                    let (chain, _) = functor_chain(tree, wrapped)?;
                    operations.require(&name, &chain)?;
                    let control = tree.name(self.control.clone());
                    set_callee(tree, call, wrapped)?;
                    if let Expr::Call { args, .. } = tree.expr_mut(call)? {
                        args.insert(0, control);
                    }
                }
                Signature::Controlled => {
                    let existing = match tree.expr(call)? {
                        Expr::Call { args, .. } => args.first().copied(),
                        _ => None,
                    };
                    let existing = existing.ok_or_else(|| {
                        CompileError::unsupported(
                            "controlled call",
                            format!("`{name}` is controlled but has no control argument"),
                        )
                    })?;
                    let control = tree.name(self.control.clone());
                    let merged = merge_control(tree, existing, control)?;
                    if let Expr::Call { args, .. } = tree.expr_mut(call)? {
                        args[0] = merged;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Derive the controlled variant of `def` under a fresh name.
///
/// A fresh control parameter is inserted first, or second when the
/// definition is method-like so the receiver stays first. Linking the
/// result in the operation table is left to the caller.
pub fn synthesize_controlled(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    def: &Definition,
) -> CompileResult<Definition> {
    let body = tree.deep_copy_block(&def.body)?;
    let base = ctx.options.control_param.clone();
    let control = ctx.fresh_name(&base);
    ControlLifter::new(control.clone()).lift_block(tree, &ctx.operations, &body)?;

    let mut params = def.params.clone();
    let position = if ctx.inside_method() {
        params.len().min(1)
    } else {
        0
    };
    params.insert(position, control);

    let name = ctx.fresh_name(&variant_base(&def.name, "ctl"));
    ctx.stats.controlled_derived += 1;
    debug!("Derived controlled {} of {}", name, def.name);
    Ok(Definition {
        name,
        params,
        body,
        operation: Some(DeriveMarkers::default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TranslateOptions;
    use proptest::prelude::*;
    use quoll_ast::Functor;

    fn prepare(tree: &mut SyntaxTree) -> Definition {
        // H(q); Controlled[X]([c], q)
        let q = tree.name("q");
        let h = tree.call_named("H", vec![q]);
        let s1 = tree.expr_stmt(h);
        let x = tree.name("X");
        let cx = tree.functor(Functor::Controlled, x);
        let c = tree.name("c");
        let controls = tree.list(vec![c]);
        let q = tree.name("q");
        let call = tree.call(cx, vec![controls, q]);
        let s2 = tree.expr_stmt(call);
        Definition {
            name: "prepare".into(),
            params: vec!["self".into(), "c".into(), "q".into()],
            body: vec![s1, s2],
            operation: Some(DeriveMarkers {
                adjoint: false,
                controlled: true,
            }),
        }
    }

    #[test]
    fn test_method_control_parameter_follows_receiver() {
        let mut tree = SyntaxTree::new();
        let def = prepare(&mut tree);
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        ctx.set_inside_method(true);

        let ctl = synthesize_controlled(&mut tree, &mut ctx, &def).unwrap();
        assert_eq!(ctl.name, "_prepare_ctl");
        assert_eq!(ctl.params, vec!["self", "__control", "c", "q"]);
        assert_eq!(
            tree.render_block(&ctl.body).unwrap(),
            vec!["Controlled[H](__control, q)", "Controlled[X]([__control, c], q)"]
        );
        assert!(!tree.shares_nodes(&def.body, &ctl.body).unwrap());
    }

    #[test]
    fn test_free_function_control_parameter_comes_first() {
        let mut tree = SyntaxTree::new();
        let mut def = prepare(&mut tree);
        def.params.remove(0);
        let mut ctx = TranslationContext::new(TranslateOptions::default());

        let ctl = synthesize_controlled(&mut tree, &mut ctx, &def).unwrap();
        assert_eq!(ctl.params, vec!["__control", "c", "q"]);
    }

    #[test]
    fn test_adjoint_only_operation_cannot_be_controlled() {
        let mut tree = SyntaxTree::new();
        let q = tree.name("q");
        let call = tree.call_named("uncompute", vec![q]);
        let stmt = tree.expr_stmt(call);
        let mut operations = OperationTable::preamble();
        operations.declare(
            "uncompute",
            DeriveMarkers {
                adjoint: true,
                controlled: false,
            },
        );

        let err = ControlLifter::new("k")
            .lift_block(&mut tree, &operations, &[stmt])
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::UndefinedVariant {
                functor: Functor::Controlled,
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn prop_repeated_lifting_stays_flat(depth in 2usize..7) {
            let mut tree = SyntaxTree::new();
            let q = tree.name("q");
            let call = tree.call_named("X", vec![q]);
            let stmt = tree.expr_stmt(call);
            let operations = OperationTable::preamble();

            for level in 0..depth {
                ControlLifter::new(format!("k{level}"))
                    .lift_block(&mut tree, &operations, &[stmt])
                    .unwrap();
            }

            let Expr::Call { func, args, .. } = tree.expr(call).unwrap().clone() else {
                panic!("expected a call");
            };
            let (chain, _) = functor_chain(&tree, func).unwrap();
            prop_assert_eq!(chain, vec![Functor::Controlled]);
            prop_assert_eq!(args.len(), 2);
            let Expr::ControlAggregate { members } = tree.expr(args[0]).unwrap() else {
                panic!("expected a control aggregate");
            };
            prop_assert_eq!(members.len(), depth);
        }
    }
}
