//! Error types for the runtime crate.

use thiserror::Error;

/// Errors raised by the runtime primitives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// A control aggregate needs at least one line.
    #[error("Control aggregate has no lines")]
    EmptyControl,

    /// An integer does not fit in the line set it is compared against.
    #[error("Value {value} does not fit in {width} lines")]
    ValueOutOfRange { value: u64, width: usize },

    /// A line index outside the allocation.
    #[error("Line {line} is outside an allocation of {width} lines")]
    LineOutOfRange { line: u32, width: u32 },

    /// Unsupported construct.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The executor was invoked without proxies.
    #[error("No measurement proxies were provided")]
    EmptyBatch,

    /// The allocation already ran its batch.
    #[error("Allocation already executed its measurements")]
    AlreadyExecuted,

    /// The backend returned the wrong number of outcomes.
    #[error("Backend returned {found} outcomes for {expected} proxies")]
    ArityMismatch { expected: usize, found: usize },

    /// Error reported by the backend itself.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
