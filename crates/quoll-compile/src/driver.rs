//! Translation entry points.

use serde::Serialize;
use tracing::{info, instrument};

use quoll_ast::SyntaxTree;

use crate::context::{TranslationContext, TranslationStats};
use crate::error::CompileResult;
use crate::manager::{PassManager, PassManagerBuilder};
use crate::options::TranslateOptions;
use crate::table::OperationTable;

/// Result of translating one module.
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    /// The rewritten module.
    pub tree: SyntaxTree,
    /// Final operation table, every derived variant resolved.
    pub operations: OperationTable,
    /// What the passes did.
    pub stats: TranslationStats,
}

/// Translates modules with a fixed set of options.
///
/// Each call to [`translate`](Translator::translate) uses a fresh
/// [`TranslationContext`]; nothing carries over between modules, so the
/// same input always yields the same output.
pub struct Translator {
    options: TranslateOptions,
    manager: PassManager,
}

impl Translator {
    /// Create a translator running the standard pipeline.
    pub fn new(options: TranslateOptions) -> Self {
        Self::with_manager(options, PassManagerBuilder::new().build())
    }

    /// Create a translator running a custom pipeline.
    pub fn with_manager(options: TranslateOptions, manager: PassManager) -> Self {
        Self { options, manager }
    }

    /// The options every translation starts from.
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate one module.
    #[instrument(skip(self, tree))]
    pub fn translate(&self, mut tree: SyntaxTree) -> CompileResult<Translation> {
        info!("Translating module with {} statements", tree.body().len());

        let mut ctx = TranslationContext::new(self.options.clone());
        self.manager.run(&mut tree, &mut ctx)?;

        let stats = ctx.stats;
        info!(
            "Translation completed: {} adjoint and {} controlled variants, {} blocks hoisted, {} conditionals lowered",
            stats.adjoints_derived,
            stats.controlled_derived,
            stats.blocks_hoisted,
            stats.conditionals_lowered
        );

        Ok(Translation {
            tree,
            operations: ctx.operations,
            stats,
        })
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslateOptions::default())
    }
}

/// Translate a module with the default options.
pub fn translate(tree: SyntaxTree) -> CompileResult<SyntaxTree> {
    Ok(Translator::default().translate(tree)?.tree)
}
