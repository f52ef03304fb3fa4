//! Error types for the compilation passes.

use quoll_ast::{AstError, Functor};
use thiserror::Error;

/// Errors that abort translation of a module.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The module uses a construct the passes cannot rewrite.
    #[error("Unsupported construct '{construct}': {detail}")]
    UnsupportedConstruct {
        /// Rendering of the offending construct.
        construct: String,
        /// Why it was rejected.
        detail: String,
    },

    /// A functor was requested on an operation that has no such variant.
    #[error("Operation '{operation}' has no {functor} variant")]
    UndefinedVariant {
        /// The operation being resolved.
        operation: String,
        /// The functor requested.
        functor: Functor,
    },

    /// Internal bookkeeping went out of sync. Always a compiler defect.
    #[error("Structural invariant violated: {0}")]
    StructuralInvariant(String),

    /// The tree itself is malformed.
    #[error("Syntax tree error: {0}")]
    Ast(#[from] AstError),
}

impl CompileError {
    /// Shorthand for [`CompileError::UnsupportedConstruct`].
    pub fn unsupported(construct: impl Into<String>, detail: impl Into<String>) -> Self {
        CompileError::UnsupportedConstruct {
            construct: construct.into(),
            detail: detail.into(),
        }
    }
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
