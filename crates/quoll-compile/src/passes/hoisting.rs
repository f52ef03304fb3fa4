//! Measurement hoisting for allocation blocks.
//!
//! Inside `with allocate(..) as q:` every `measure(..)` call is replaced by
//! a placeholder. When the block has been walked, the relocated calls are
//! bound to proxy temporaries and a single `bp.execute(..)` call resolves
//! them all at once, destructured into the placeholders in table order:
//!
//! ```text
//! _mp1 = measure(a)
//! _mp2 = measure(b)
//! (_m1, _m2) = bp.execute(_mp1, _mp2)
//! ```
//!
//! The statements go right before the statement that held the earliest
//! measurement, so the backend runs once per block.

use tracing::debug;

use quoll_ast::{Expr, NodeId, SyntaxTree};

use super::is_call_to;
use crate::context::{HoistEntry, TranslationContext};
use crate::error::{CompileError, CompileResult};
use crate::options::TranslateOptions;

/// Whether a scoped block context allocates quantum lines.
pub fn is_allocation(
    tree: &SyntaxTree,
    options: &TranslateOptions,
    context: NodeId,
) -> CompileResult<bool> {
    is_call_to(tree, context, &options.allocate_fn)
}

/// Replace the measurement calls of `expr` by placeholders.
///
/// Calls are taken in evaluation order and recorded in the innermost open
/// allocation frame. Outside any allocation block nothing changes.
pub fn replace_measurements(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    expr: NodeId,
) -> CompileResult<()> {
    if ctx.allocation_depth() == 0 {
        return Ok(());
    }
    let mut found = Vec::new();
    collect_measurements(tree, &ctx.options.measure_fn, expr, &mut found)?;
    for site in found {
        // The call moves to a fresh node; its old slot becomes the
        // placeholder so no parent needs rewriting.
        let call = tree.expr(site)?.clone();
        let relocated = tree.add_expr(call);
        let Some(placeholder) = ctx.record_measurement(relocated) else {
            return Err(CompileError::StructuralInvariant(
                "measurement recorded without an allocation frame".into(),
            ));
        };
        *tree.expr_mut(site)? = Expr::Name(placeholder);
    }
    Ok(())
}

fn collect_measurements(
    tree: &SyntaxTree,
    measure_fn: &str,
    expr: NodeId,
    found: &mut Vec<NodeId>,
) -> CompileResult<()> {
    if is_call_to(tree, expr, measure_fn)? {
        found.push(expr);
        return Ok(());
    }
    for child in tree.expr(expr)?.children() {
        collect_measurements(tree, measure_fn, child, found)?;
    }
    Ok(())
}

/// Insert the proxy bindings and the batched execution into `body`.
///
/// `entries` is the table of the block that owns `body`, in recording
/// order. Nothing is emitted for an empty table.
pub fn emit_batch(
    tree: &mut SyntaxTree,
    ctx: &mut TranslationContext,
    entries: Vec<HoistEntry>,
    body: &mut Vec<NodeId>,
) -> CompileResult<()> {
    let Some(position) = entries.iter().map(|entry| entry.index).min() else {
        return Ok(());
    };
    let count = entries.len();

    let mut emitted = Vec::with_capacity(count + 1);
    let mut proxies = Vec::with_capacity(count);
    let mut placeholders = Vec::with_capacity(count);
    for (ordinal, entry) in entries.into_iter().enumerate() {
        let base = format!("{}{}", ctx.options.proxy_prefix, ordinal + 1);
        let proxy = ctx.fresh_name(&base);
        let target = tree.name(proxy.clone());
        emitted.push(tree.assign(target, entry.call));
        proxies.push(proxy);
        placeholders.push(entry.placeholder);
    }

    let alias = tree.name(ctx.options.boilerplate_alias.clone());
    let execute = tree.attribute(alias, ctx.options.execute_fn.clone());
    let args: Vec<NodeId> = proxies.into_iter().map(|proxy| tree.name(proxy)).collect();
    let call = tree.call(execute, args);
    let targets: Vec<NodeId> = placeholders.into_iter().map(|name| tree.name(name)).collect();
    let target = tree.tuple(targets);
    emitted.push(tree.assign(target, call));

    let position = position.min(body.len());
    body.splice(position..position, emitted);

    ctx.stats.blocks_hoisted += 1;
    ctx.stats.measurements_hoisted += count;
    debug!(
        "Hoisted {} measurements into one batch at statement {}",
        count, position
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_outside_allocation_is_kept() {
        let mut tree = SyntaxTree::new();
        let q = tree.name("q");
        let call = tree.call_named("measure", vec![q]);
        let mut ctx = TranslationContext::new(TranslateOptions::default());

        replace_measurements(&mut tree, &mut ctx, call).unwrap();
        assert_eq!(tree.render_expr(call).unwrap(), "measure(q)");
    }

    #[test]
    fn test_nested_measurements_are_found_in_order() {
        let mut tree = SyntaxTree::new();
        let a = tree.name("a");
        let first = tree.call_named("measure", vec![a]);
        let b = tree.name("b");
        let second = tree.call_named("measure", vec![b]);
        let sum = tree.call_named("max", vec![first, second]);
        let block = NodeId(999);
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        ctx.push_allocation(block);

        replace_measurements(&mut tree, &mut ctx, sum).unwrap();
        assert_eq!(tree.render_expr(sum).unwrap(), "max(_m1, _m2)");

        let entries = ctx.pop_allocation(block).unwrap();
        assert_eq!(tree.render_expr(entries[0].call).unwrap(), "measure(a)");
        assert_eq!(tree.render_expr(entries[1].call).unwrap(), "measure(b)");
    }

    #[test]
    fn test_empty_table_emits_nothing() {
        let mut tree = SyntaxTree::new();
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        let mut body = vec![];
        emit_batch(&mut tree, &mut ctx, vec![], &mut body).unwrap();
        assert!(body.is_empty());
        assert_eq!(ctx.stats.blocks_hoisted, 0);
    }
}
