//! Verification of the translated module.

use tracing::debug;

use quoll_ast::{Functor, Node, Stmt, SyntaxTree};

use crate::context::TranslationContext;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};

/// Analysis pass that checks the invariants the rewrite must leave behind.
///
/// - every allocation frame and hoisting table has been closed
/// - every node is reachable from exactly one place, so no derived variant
///   aliases the body it was derived from
/// - every variant an operation requested resolves to a definition
///
/// Any failure is a compiler defect and reported as
/// [`CompileError::StructuralInvariant`].
pub struct VerifyTranslation;

impl Pass for VerifyTranslation {
    fn name(&self) -> &'static str {
        "verify_translation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, tree: &mut SyntaxTree, ctx: &mut TranslationContext) -> CompileResult<()> {
        ctx.check_balanced()?;

        let mut seen = vec![false; tree.len()];
        let mut checked = 0usize;
        for &root in tree.body() {
            for id in tree.subtree(root)? {
                if std::mem::replace(&mut seen[id.index()], true) {
                    return Err(CompileError::StructuralInvariant(format!(
                        "node {id} is reachable from more than one place"
                    )));
                }
                if let Node::Stmt(Stmt::Def(def)) = tree.node(id)? {
                    for functor in [Functor::Adjoint, Functor::Controlled] {
                        if def.markers().requests(functor) {
                            ctx.operations.resolve(&def.name, functor).map_err(|_| {
                                CompileError::StructuralInvariant(format!(
                                    "{functor} variant of '{}' was requested but never derived",
                                    def.name
                                ))
                            })?;
                        }
                    }
                }
                checked += 1;
            }
        }
        debug!("Verified {} reachable nodes", checked);
        Ok(())
    }
}
