//! Operation table inference.

use tracing::debug;

use quoll_ast::{Expr, Node, Stmt, SyntaxTree};

use crate::context::TranslationContext;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};

/// Analysis pass that registers every operation definition of the module.
///
/// Definitions are found at any depth: inside classes, allocation blocks
/// and conditionals. Each operation is declared with its derivation
/// markers, so a requested variant is known to exist before any body is
/// rewritten. The pass also reserves every identifier the module already
/// uses so generated names can never shadow one.
pub struct InferOperations;

impl Pass for InferOperations {
    fn name(&self) -> &'static str {
        "infer_operations"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, tree: &mut SyntaxTree, ctx: &mut TranslationContext) -> CompileResult<()> {
        let mut declared = 0usize;
        for &root in tree.body() {
            for id in tree.subtree(root)? {
                match tree.node(id)? {
                    Node::Stmt(Stmt::Def(def)) => {
                        ctx.reserve_name(def.name.clone());
                        for param in &def.params {
                            ctx.reserve_name(param.clone());
                        }
                        if let Some(markers) = def.operation {
                            ctx.operations.declare(def.name.clone(), markers);
                            declared += 1;
                        }
                    }
                    Node::Stmt(Stmt::Class { name, .. }) => ctx.reserve_name(name.clone()),
                    Node::Stmt(Stmt::Import { alias, .. }) => ctx.reserve_name(alias.clone()),
                    Node::Expr(Expr::Name(name)) => ctx.reserve_name(name.clone()),
                    _ => {}
                }
            }
        }
        debug!(
            "Declared {} module operations, {} known in total",
            declared,
            ctx.operations.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TranslateOptions;
    use quoll_ast::{DeriveMarkers, Definition, Functor};

    #[test]
    fn test_infers_methods_and_reserves_names() {
        let mut tree = SyntaxTree::new();
        let q = tree.name("q");
        let call = tree.call_named("H", vec![q]);
        let stmt = tree.expr_stmt(call);
        let method = tree.add_stmt(Stmt::Def(Definition {
            name: "prepare".into(),
            params: vec!["self".into(), "q".into()],
            body: vec![stmt],
            operation: Some(DeriveMarkers {
                adjoint: false,
                controlled: true,
            }),
        }));
        let class = tree.add_stmt(Stmt::Class {
            name: "Register".into(),
            body: vec![method],
        });
        tree.push_body(class);

        let mut ctx = TranslationContext::new(TranslateOptions::default());
        InferOperations.run(&mut tree, &mut ctx).unwrap();

        assert!(ctx.operations.supports("prepare", Functor::Controlled));
        assert!(!ctx.operations.supports("prepare", Functor::Adjoint));
        assert_eq!(ctx.fresh_name("Register"), "Register_1");
        assert_eq!(ctx.fresh_name("q"), "q_1");
    }

    #[test]
    fn test_plain_functions_are_not_operations() {
        let mut tree = SyntaxTree::new();
        let def = tree.add_stmt(Stmt::Def(Definition {
            name: "helper".into(),
            params: vec![],
            body: vec![],
            operation: None,
        }));
        tree.push_body(def);

        let mut ctx = TranslationContext::new(TranslateOptions::default());
        InferOperations.run(&mut tree, &mut ctx).unwrap();
        assert!(!ctx.operations.contains("helper"));
        assert_eq!(ctx.fresh_name("helper"), "helper_1");
    }
}
