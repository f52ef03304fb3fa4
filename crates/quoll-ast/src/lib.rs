//! Quoll Syntax Tree Model
//!
//! This crate defines the tree the Quoll rewriting passes consume and
//! produce. Parsing source text into this tree and serializing it back are
//! the job of external collaborators; this crate only fixes the shape.
//!
//! # Overview
//!
//! Nodes live in a per-module arena ([`SyntaxTree`]) and reference each
//! other by [`NodeId`]. Passes that derive new code from existing code copy
//! subtrees with [`SyntaxTree::deep_copy_block`], so an original body and a
//! derived variant never alias a node and can be rewritten independently.
//!
//! # Node kinds
//!
//! | Kind | Examples |
//! |------|----------|
//! | Expressions | `q`, `H(q)`, `Adjoint[Controlled[X]]`, `[c, d]`, `q == 3` |
//! | Statements | `x = e`, `def f(..)`, `with allocate(2) as q:`, `if ...:` |
//! | Wiring | `Adjoint[f] := _f_adj` (functor links emitted by the compiler) |
//!
//! # Example
//!
//! ```rust
//! use quoll_ast::{Functor, SyntaxTree};
//!
//! let mut tree = SyntaxTree::new();
//! let x = tree.name("X");
//! let controlled = tree.functor(Functor::Controlled, x);
//! let c = tree.name("c");
//! let controls = tree.list(vec![c]);
//! let q = tree.name("q");
//! let call = tree.call(controlled, vec![controls, q]);
//! let stmt = tree.expr_stmt(call);
//! tree.push_body(stmt);
//!
//! assert_eq!(tree.render_module().unwrap(), "Controlled[X]([c], q)");
//! ```

pub mod display;
pub mod error;
pub mod node;
pub mod tree;

pub use error::{AstError, AstResult};
pub use node::{
    CompareOp, DeriveMarkers, Definition, Expr, Functor, Keyword, Node, NodeId, Stmt,
};
pub use tree::SyntaxTree;
