//! Quoll Translation Passes
//!
//! This crate rewrites a Quoll module into plain code the runtime can
//! execute. It derives the functor variants operations ask for, batches
//! measurements per allocation block and lowers quantum conditionals into
//! control scopes.
//!
//! # Overview
//!
//! Translation runs a short pipeline of passes over a
//! [`SyntaxTree`](quoll_ast::SyntaxTree):
//! 1. **Inference**: register every operation and its derivation markers
//! 2. **Boilerplate**: import the runtime helpers
//! 3. **Lowering**: one recursive rewrite that hoists measurements, lowers
//!    conditionals and expands each operation into its variants
//! 4. **Verification**: check the structural invariants of the result
//!
//! # Architecture
//!
//! ```text
//! Input module
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- TranslationContext (names, frames, operation table)
//! +-------------+
//!       |
//!       +-- InferOperations
//!       +-- InjectBoilerplate
//!       +-- LowerModule
//!       |     +-- measurement hoisting
//!       |     +-- conditional lowering
//!       |     +-- adjoint / controlled synthesis
//!       +-- VerifyTranslation
//!       |
//!       v
//! Output module + resolved operation table
//! ```
//!
//! # Example
//!
//! ```rust
//! use quoll_ast::{Definition, DeriveMarkers, Stmt, SyntaxTree};
//! use quoll_compile::{Functor, TranslateOptions, Translator};
//!
//! // @qdef(adj=True)
//! // def prepare(q):
//! //     H(q)
//! let mut tree = SyntaxTree::new();
//! let q = tree.name("q");
//! let call = tree.call_named("H", vec![q]);
//! let body = tree.expr_stmt(call);
//! let def = tree.add_stmt(Stmt::Def(Definition {
//!     name: "prepare".into(),
//!     params: vec!["q".into()],
//!     body: vec![body],
//!     operation: Some(DeriveMarkers { adjoint: true, controlled: false }),
//! }));
//! tree.push_body(def);
//!
//! let translation = Translator::new(TranslateOptions::default())
//!     .translate(tree)
//!     .unwrap();
//! assert_eq!(
//!     translation.operations.resolve("prepare", Functor::Adjoint).unwrap(),
//!     "_prepare_adj"
//! );
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait and hand a [`PassManager`] to
//! [`Translator::with_manager`]:
//!
//! ```rust
//! use quoll_ast::SyntaxTree;
//! use quoll_compile::{CompileResult, Pass, PassKind, TranslationContext};
//!
//! struct CountStatements;
//!
//! impl Pass for CountStatements {
//!     fn name(&self) -> &str { "count_statements" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, tree: &mut SyntaxTree, _ctx: &mut TranslationContext) -> CompileResult<()> {
//!         println!("{} statements", tree.body().len());
//!         Ok(())
//!     }
//! }
//! ```

pub mod context;
pub mod driver;
pub mod error;
pub mod functor;
pub mod manager;
pub mod naming;
pub mod options;
pub mod pass;
pub mod table;

// Built-in passes
pub mod passes;

pub use context::{TranslationContext, TranslationStats};
pub use driver::{Translation, Translator, translate};
pub use error::{CompileError, CompileResult};
pub use functor::Signature;
pub use manager::{PassManager, PassManagerBuilder};
pub use naming::{NameGenerator, variant_base};
pub use options::TranslateOptions;
pub use pass::{Pass, PassKind};
pub use quoll_ast::Functor;
pub use table::{OperationEntry, OperationTable, Resolution};
