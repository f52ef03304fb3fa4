//! Quantum conditional lowering.
//!
//! `if superposition(lines == value): body` becomes
//!
//! ```text
//! with bp.control_scope(lines, value) as __control:
//!     <body, control-lifted with __control>
//! ```
//!
//! On enter the scope flips every line whose bit of `value` is 0 (most
//! significant bit on the first line), so all lines read 1 exactly when
//! the comparison held; on exit it applies the same flips again.

use tracing::debug;

use quoll_ast::{CompareOp, Expr, NodeId, Stmt, SyntaxTree};

use super::controlled::ControlLifter;
use super::is_call_to;
use crate::context::TranslationContext;
use crate::error::{CompileError, CompileResult};
use crate::options::TranslateOptions;

/// Whether `stmt` is a conditional whose test is the quantum marker.
pub fn is_quantum_conditional(
    tree: &SyntaxTree,
    options: &TranslateOptions,
    stmt: NodeId,
) -> CompileResult<bool> {
    match tree.stmt(stmt)? {
        Stmt::If { test, .. } => is_call_to(tree, *test, &options.condition_fn),
        _ => Ok(false),
    }
}

/// Whether a scoped block context is a control scope emitted by this pass.
pub fn is_control_scope(
    tree: &SyntaxTree,
    options: &TranslateOptions,
    context: NodeId,
) -> CompileResult<bool> {
    let Expr::Call { func, .. } = tree.expr(context)? else {
        return Ok(false);
    };
    let Expr::Attribute { value, attr } = tree.expr(*func)? else {
        return Ok(false);
    };
    Ok(*attr == options.scope_fn
        && matches!(tree.expr(*value)?, Expr::Name(alias) if *alias == options.boilerplate_alias))
}

/// Rewrite the quantum conditional `stmt` into a control scope, in place.
///
/// The branch body must already be lowered. Fails on an `else` branch and
/// on any test other than a single equality comparison.
pub fn lower_conditional(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    stmt: NodeId,
) -> CompileResult<()> {
    let Stmt::If { test, body, orelse } = tree.stmt(stmt)?.clone() else {
        return Err(CompileError::StructuralInvariant(format!(
            "{stmt} is not a conditional"
        )));
    };
    if !orelse.is_empty() {
        return Err(CompileError::unsupported(
            "quantum conditional",
            "only a single branch is supported, found an else branch",
        ));
    }
    let (lines, value) = comparison_operands(tree, &ctx.options, test)?;

    let base = ctx.options.control_param.clone();
    let control = ctx.fresh_name(&base);
    ControlLifter::new(control.clone()).lift_block(tree, &ctx.operations, &body)?;

    let alias = tree.name(ctx.options.boilerplate_alias.clone());
    let scope = tree.attribute(alias, ctx.options.scope_fn.clone());
    let context = tree.call(scope, vec![lines, value]);
    let binding = tree.name(control.clone());
    *tree.stmt_mut(stmt)? = Stmt::With {
        context,
        binding: Some(binding),
        body,
    };

    ctx.stats.conditionals_lowered += 1;
    debug!("Lowered quantum conditional {} under {}", stmt, control);
    Ok(())
}

/// Split `superposition(a == b)` into (line set, integer value).
fn comparison_operands(
    tree: &SyntaxTree,
    options: &TranslateOptions,
    test: NodeId,
) -> CompileResult<(NodeId, NodeId)> {
    let argument = match tree.expr(test)? {
        Expr::Call { args, keywords, .. } if args.len() == 1 && keywords.is_empty() => args[0],
        _ => {
            return Err(CompileError::unsupported(
                "quantum conditional",
                format!("`{}` takes exactly one comparison", options.condition_fn),
            ));
        }
    };
    match tree.expr(argument)? {
        Expr::Compare {
            left,
            op: CompareOp::Eq,
            right,
        } => {
            if matches!(tree.expr(*left)?, Expr::Int(_)) {
                Ok((*right, *left))
            } else {
                Ok((*left, *right))
            }
        }
        Expr::Compare { .. } => Err(CompileError::unsupported(
            "quantum conditional",
            "only equality comparisons can be lowered",
        )),
        other => Err(CompileError::unsupported(
            "quantum conditional",
            format!("expected a comparison, found {}", other.kind_name()),
        )),
    }
}
