//! Pass trait and types for translation passes.

use quoll_ast::SyntaxTree;

use crate::context::TranslationContext;
use crate::error::CompileResult;

/// The kind of translation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads the tree and records into the context.
    Analysis,
    /// Transformation pass that rewrites the tree.
    Transformation,
}

/// A translation pass that operates on a module syntax tree.
///
/// Every pass receives the tree and the [`TranslationContext`] of the
/// current compilation. State never outlives the context.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given tree.
    ///
    /// Analysis passes must not modify the tree but may update the
    /// context (operation table, reserved names).
    fn run(&self, tree: &mut SyntaxTree, ctx: &mut TranslationContext) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _tree: &SyntaxTree, _ctx: &TranslationContext) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TranslateOptions;

    struct CountBody;

    impl Pass for CountBody {
        fn name(&self) -> &'static str {
            "count_body"
        }

        fn kind(&self) -> PassKind {
            PassKind::Analysis
        }

        fn run(&self, tree: &mut SyntaxTree, ctx: &mut TranslationContext) -> CompileResult<()> {
            for index in 0..tree.body().len() {
                ctx.reserve_name(format!("stmt{index}"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_pass_kind() {
        let pass = CountBody;
        assert_eq!(pass.kind(), PassKind::Analysis);
        assert_eq!(pass.name(), "count_body");

        let mut tree = SyntaxTree::new();
        let stmt = tree.add_stmt(quoll_ast::Stmt::Pass);
        tree.push_body(stmt);
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        pass.run(&mut tree, &mut ctx).unwrap();
        assert_eq!(ctx.fresh_name("stmt0"), "stmt0_1");
    }
}
