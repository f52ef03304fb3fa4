//! Boilerplate import injection.

use quoll_ast::{Stmt, SyntaxTree};

use crate::context::TranslationContext;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};

/// Prepends `import <boilerplate_module> as <alias>` to the module.
///
/// Generated code calls the executor and the control scopes through this
/// alias. A module that already carries the exact import is left alone.
pub struct InjectBoilerplate;

impl Pass for InjectBoilerplate {
    fn name(&self) -> &'static str {
        "inject_boilerplate"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, tree: &mut SyntaxTree, ctx: &mut TranslationContext) -> CompileResult<()> {
        let import = tree.add_stmt(Stmt::Import {
            module: ctx.options.boilerplate_module.clone(),
            alias: ctx.options.boilerplate_alias.clone(),
        });
        let mut body = Vec::with_capacity(tree.body().len() + 1);
        body.push(import);
        body.extend_from_slice(tree.body());
        tree.set_body(body);
        Ok(())
    }

    fn should_run(&self, tree: &SyntaxTree, ctx: &TranslationContext) -> bool {
        !tree.body().iter().any(|&id| {
            matches!(
                tree.stmt(id),
                Ok(Stmt::Import { module, alias })
                    if *module == ctx.options.boilerplate_module
                        && *alias == ctx.options.boilerplate_alias
            )
        })
    }
}
