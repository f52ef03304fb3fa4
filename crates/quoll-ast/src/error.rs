//! Error types for the syntax tree crate.

use crate::node::NodeId;
use thiserror::Error;

/// Errors that can occur while reading or editing a syntax tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AstError {
    /// Node id does not belong to this tree.
    #[error("Node {0} not found in syntax tree")]
    NodeNotFound(NodeId),

    /// The node exists but is of the other kind.
    #[error("Node {id} is {found}, expected {expected}")]
    KindMismatch {
        /// The offending node.
        id: NodeId,
        /// What the caller asked for.
        expected: &'static str,
        /// What the arena actually holds.
        found: &'static str,
    },

    /// The tree could not be decoded from JSON.
    #[error("Invalid syntax tree document: {0}")]
    InvalidDocument(String),
}

/// Result type for syntax tree operations.
pub type AstResult<T> = Result<T, AstError>;
