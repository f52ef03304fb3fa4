//! Pass manager for orchestrating translation.

use tracing::{debug, info, instrument};

use quoll_ast::SyntaxTree;

use crate::context::TranslationContext;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{InferOperations, InjectBoilerplate, LowerModule, VerifyTranslation};

/// Manages and executes a sequence of translation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given tree.
    #[instrument(skip(self, tree, ctx))]
    pub fn run(&self, tree: &mut SyntaxTree, ctx: &mut TranslationContext) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on module with {} statements",
            self.passes.len(),
            tree.body().len()
        );

        for pass in &self.passes {
            if pass.should_run(tree, ctx) {
                debug!("Running pass: {}", pass.name());
                pass.run(tree, ctx)?;
                debug!("Pass {} completed, nodes: {}", pass.name(), tree.len());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, statements: {}, nodes: {}",
            tree.body().len(),
            tree.len()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard translation pipeline.
pub struct PassManagerBuilder {
    /// Prepend the boilerplate import.
    boilerplate: bool,
    /// Check structural invariants after lowering.
    verification: bool,
}

impl PassManagerBuilder {
    /// Create a new builder with every stage enabled.
    pub fn new() -> Self {
        Self {
            boilerplate: true,
            verification: true,
        }
    }

    /// Enable or disable the boilerplate import.
    #[must_use]
    pub fn with_boilerplate(mut self, enabled: bool) -> Self {
        self.boilerplate = enabled;
        self
    }

    /// Enable or disable the final verification pass.
    #[must_use]
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verification = enabled;
        self
    }

    /// Build the pass manager.
    pub fn build(self) -> PassManager {
        let mut pm = PassManager::new();

        // The table must be complete before any body is rewritten.
        pm.add_pass(InferOperations);

        if self.boilerplate {
            pm.add_pass(InjectBoilerplate);
        }

        pm.add_pass(LowerModule);

        if self.verification {
            pm.add_pass(VerifyTranslation);
        }

        pm
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
