//! Built-in translation passes.
//!
//! - [`InferOperations`]: builds the operation table from the module
//! - [`InjectBoilerplate`]: imports the runtime helpers
//! - [`LowerModule`]: hoists measurements, lowers quantum conditionals and
//!   derives the requested functor variants
//! - [`VerifyTranslation`]: checks the structural invariants of the result
//!
//! The rewriting helpers used by [`LowerModule`] live in their own modules
//! so the synthesizers can be driven independently in tests.

pub mod adjoint;
pub mod boilerplate;
pub mod conditional;
pub mod controlled;
pub mod hoisting;
pub mod infer;
pub mod lower;
pub mod verify;

pub use boilerplate::InjectBoilerplate;
pub use infer::InferOperations;
pub use lower::LowerModule;
pub use verify::VerifyTranslation;

use quoll_ast::{Expr, NodeId, SyntaxTree};

use crate::error::CompileResult;

/// Call nodes of an expression, in evaluation order.
pub(crate) fn calls_in(tree: &SyntaxTree, expr: NodeId) -> CompileResult<Vec<NodeId>> {
    let mut calls = Vec::new();
    for id in tree.subtree(expr)? {
        if let Expr::Call { .. } = tree.expr(id)? {
            calls.push(id);
        }
    }
    Ok(calls)
}

/// Callee of a call node.
pub(crate) fn callee(tree: &SyntaxTree, call: NodeId) -> CompileResult<NodeId> {
    match tree.expr(call)? {
        Expr::Call { func, .. } => Ok(*func),
        other => Err(quoll_ast::AstError::KindMismatch {
            id: call,
            expected: "call",
            found: other.kind_name(),
        }
        .into()),
    }
}

/// Point a call at a new callee.
pub(crate) fn set_callee(tree: &mut SyntaxTree, call: NodeId, new_callee: NodeId) -> CompileResult<()> {
    if let Expr::Call { func, .. } = tree.expr_mut(call)? {
        *func = new_callee;
    }
    Ok(())
}

/// Whether `expr` is a call to the plain name `name`.
pub(crate) fn is_call_to(tree: &SyntaxTree, expr: NodeId, name: &str) -> CompileResult<bool> {
    Ok(match tree.expr(expr)? {
        Expr::Call { func, .. } => matches!(tree.expr(*func)?, Expr::Name(n) if n == name),
        _ => false,
    })
}
