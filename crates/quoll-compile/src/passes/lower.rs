//! Module lowering: the single recursive rewrite over the module body.

use tracing::debug;

use quoll_ast::{Definition, Functor, NodeId, Stmt, SyntaxTree};

use super::adjoint::synthesize_adjoint;
use super::conditional::{is_quantum_conditional, lower_conditional};
use super::controlled::synthesize_controlled;
use super::hoisting::{emit_batch, is_allocation, replace_measurements};
use crate::context::TranslationContext;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};

/// Transformation pass that rewrites every statement of the module.
///
/// - allocation blocks get their measurements hoisted into one batch
/// - quantum conditionals become control scopes
/// - operation definitions are followed by their derived variants and the
///   wiring that links them
///
/// Bodies are rewritten inside-out: a definition's own body is lowered
/// before any variant is derived from it.
pub struct LowerModule;

impl Pass for LowerModule {
    fn name(&self) -> &'static str {
        "lower_module"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, tree: &mut SyntaxTree, ctx: &mut TranslationContext) -> CompileResult<()> {
        let body = tree.body().to_vec();
        let lowered = lower_block(tree, ctx, &body)?;
        tree.set_body(lowered);
        Ok(())
    }
}

fn lower_block(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    block: &[NodeId],
) -> CompileResult<Vec<NodeId>> {
    let mut out = Vec::with_capacity(block.len());
    for &stmt in block {
        out.extend(lower_statement(tree, ctx, stmt)?);
    }
    Ok(out)
}

/// Lower one statement; definitions may expand into several.
fn lower_statement(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    stmt: NodeId,
) -> CompileResult<Vec<NodeId>> {
    match tree.stmt(stmt)?.clone() {
        Stmt::Expr(expr) => replace_measurements(tree, ctx, expr)?,
        Stmt::Assign { value, .. } => replace_measurements(tree, ctx, value)?,
        Stmt::Def(def) => return lower_definition(tree, ctx, stmt, def),
        Stmt::Class { body, .. } => {
            let outer = ctx.set_inside_method(true);
            let lowered = lower_block(tree, ctx, &body);
            ctx.set_inside_method(outer);
            let lowered = lowered?;
            if let Stmt::Class { body, .. } = tree.stmt_mut(stmt)? {
                *body = lowered;
            }
        }
        Stmt::With { context, body, .. } if is_allocation(tree, &ctx.options, context)? => {
            replace_measurements(tree, ctx, context)?;
            lower_allocation(tree, ctx, stmt, &body)?;
        }
        Stmt::With { context, body, .. } => {
            replace_measurements(tree, ctx, context)?;
            let lowered = lower_block(tree, ctx, &body)?;
            if let Stmt::With { body, .. } = tree.stmt_mut(stmt)? {
                *body = lowered;
            }
        }
        Stmt::If { test, body, orelse } => {
            let quantum = is_quantum_conditional(tree, &ctx.options, stmt)?;
            if !quantum {
                replace_measurements(tree, ctx, test)?;
            }
            let body = lower_block(tree, ctx, &body)?;
            let orelse = lower_block(tree, ctx, &orelse)?;
            if let Stmt::If {
                body: old_body,
                orelse: old_orelse,
                ..
            } = tree.stmt_mut(stmt)?
            {
                *old_body = body;
                *old_orelse = orelse;
            }
            if quantum {
                lower_conditional(tree, ctx, stmt)?;
            }
        }
        Stmt::Import { .. } | Stmt::Wire { .. } | Stmt::Pass => {}
    }
    Ok(vec![stmt])
}

/// Walk an allocation block once, then emit its measurement batch.
fn lower_allocation(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    stmt: NodeId,
    body: &[NodeId],
) -> CompileResult<()> {
    ctx.push_allocation(stmt);
    let mut lowered = Vec::with_capacity(body.len());
    for &nested in body {
        // Index in the rewritten body, where this statement's expansion starts.
        ctx.enter_statement(lowered.len())?;
        lowered.extend(lower_statement(tree, ctx, nested)?);
    }
    let entries = ctx.pop_allocation(stmt)?;
    emit_batch(tree, ctx, entries, &mut lowered)?;
    if let Stmt::With { body, .. } = tree.stmt_mut(stmt)? {
        *body = lowered;
    }
    Ok(())
}

/// Lower a definition body, then derive the variants its markers request.
///
/// Returns the statements replacing the definition, in order: the
/// original, then each derived variant followed by its wiring.
fn lower_definition(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    stmt: NodeId,
    def: Definition,
) -> CompileResult<Vec<NodeId>> {
    // Measurements in a nested definition belong to that definition.
    let suspended = ctx.suspend_allocations();
    let method_like = ctx.set_inside_method(false);
    let lowered = lower_block(tree, ctx, &def.body);
    ctx.set_inside_method(method_like);
    let lowered = lowered?;
    ctx.resume_allocations(suspended)?;

    if let Stmt::Def(stored) = tree.stmt_mut(stmt)? {
        stored.body = lowered.clone();
    }
    let def = Definition {
        body: lowered,
        ..def
    };

    let mut out = vec![stmt];
    let markers = def.markers();
    if !def.is_operation() || !(markers.adjoint || markers.controlled) {
        return Ok(out);
    }

    let mut adjoint = None;
    if markers.adjoint {
        let derived = synthesize_adjoint(tree, ctx, &def)?;
        let name = derived.name.clone();
        out.push(tree.add_stmt(Stmt::Def(derived)));
        link(tree, ctx, &mut out, Functor::Adjoint, &def.name, &name);
        link(tree, ctx, &mut out, Functor::Adjoint, &name, &def.name);
        adjoint = Some(name);
    }

    if markers.controlled {
        let controlled = synthesize_controlled(tree, ctx, &def)?;
        let name = controlled.name.clone();
        let both = match adjoint {
            Some(_) => Some(synthesize_adjoint(tree, ctx, &controlled)?),
            None => None,
        };
        out.push(tree.add_stmt(Stmt::Def(controlled)));
        link(tree, ctx, &mut out, Functor::Controlled, &def.name, &name);
        link(tree, ctx, &mut out, Functor::Controlled, &name, &name);

        if let (Some(adjoint), Some(both)) = (adjoint, both) {
            // Adjoint[Controlled[op]] and Controlled[Adjoint[op]] share one variant.
            let both_name = both.name.clone();
            out.push(tree.add_stmt(Stmt::Def(both)));
            link(tree, ctx, &mut out, Functor::Adjoint, &name, &both_name);
            link(tree, ctx, &mut out, Functor::Adjoint, &both_name, &name);
            link(tree, ctx, &mut out, Functor::Controlled, &adjoint, &both_name);
            link(tree, ctx, &mut out, Functor::Controlled, &both_name, &both_name);
        }
    }

    debug!("Expanded {} into {} statements", def.name, out.len());
    Ok(out)
}

/// Record `functor[operation] = variant` in the table and emit its wiring.
fn link(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    out: &mut Vec<NodeId>,
    functor: Functor,
    operation: &str,
    variant: &str,
) {
    ctx.operations.link(operation, functor, variant);
    out.push(tree.add_stmt(Stmt::Wire {
        functor,
        operation: operation.to_string(),
        variant: variant.to_string(),
    }));
}
