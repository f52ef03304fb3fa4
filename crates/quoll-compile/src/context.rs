//! Per-compilation translation state.
//!
//! A [`TranslationContext`] is created for one module, threaded through
//! every pass by mutable reference, and dropped when translation ends. It
//! is the only place mutable state lives: the naming counters, the stack
//! of allocation frames with their hoisting tables, the method-body flag
//! and the operation table.

use serde::Serialize;

use quoll_ast::NodeId;

use crate::error::{CompileError, CompileResult};
use crate::naming::NameGenerator;
use crate::options::TranslateOptions;
use crate::table::OperationTable;

/// One allocation block currently being rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationFrame {
    /// The scoped block statement that owns the lines.
    pub block: NodeId,
    /// Index of the top-level statement of the block being walked.
    pub statement: usize,
}

/// A measurement call lifted out of an allocation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoistEntry {
    /// Allocation block the measurement belongs to.
    pub block: NodeId,
    /// Top-level statement index the call was found in.
    pub index: usize,
    /// The original measurement call, now detached from its statement.
    pub call: NodeId,
    /// Identifier that replaced the call.
    pub placeholder: String,
}

/// Counters reported once translation finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    /// Adjoint variants derived.
    pub adjoints_derived: usize,
    /// Controlled variants derived.
    pub controlled_derived: usize,
    /// Allocation blocks whose measurements were batched.
    pub blocks_hoisted: usize,
    /// Measurement calls replaced by placeholders.
    pub measurements_hoisted: usize,
    /// Quantum conditionals lowered to control scopes.
    pub conditionals_lowered: usize,
}

/// Frames set aside while rewriting a nested definition.
#[derive(Debug, Default)]
#[must_use = "suspended frames must be handed back to resume_allocations"]
pub struct SuspendedFrames {
    frames: Vec<AllocationFrame>,
    tables: Vec<Vec<HoistEntry>>,
}

/// Mutable state of one module compilation.
#[derive(Debug)]
pub struct TranslationContext {
    /// Marker names and defaults.
    pub options: TranslateOptions,
    /// Known operations and their functor resolutions.
    pub operations: OperationTable,
    /// Counters reported at the end.
    pub stats: TranslationStats,
    names: NameGenerator,
    frames: Vec<AllocationFrame>,
    tables: Vec<Vec<HoistEntry>>,
    inside_method: bool,
}

impl TranslationContext {
    /// Create the context for one compilation.
    pub fn new(options: TranslateOptions) -> Self {
        let operations = options.operations.clone();
        Self {
            options,
            operations,
            stats: TranslationStats::default(),
            names: NameGenerator::new(),
            frames: Vec::new(),
            tables: Vec::new(),
            inside_method: false,
        }
    }

    /// Fresh identifier derived from `base`.
    pub fn fresh_name(&mut self, base: &str) -> String {
        self.names.fresh_name(base)
    }

    /// Mark a name the module already uses.
    pub fn reserve_name(&mut self, name: impl Into<String>) {
        self.names.reserve(name);
    }

    /// Whether definitions currently being rewritten are method-like.
    pub fn inside_method(&self) -> bool {
        self.inside_method
    }

    /// Set the method-like flag, returning the previous value.
    pub fn set_inside_method(&mut self, inside: bool) -> bool {
        std::mem::replace(&mut self.inside_method, inside)
    }

    /// Number of allocation blocks currently open.
    pub fn allocation_depth(&self) -> usize {
        self.frames.len()
    }

    /// Open a frame and its hoisting table for an allocation block.
    pub fn push_allocation(&mut self, block: NodeId) {
        self.frames.push(AllocationFrame {
            block,
            statement: 0,
        });
        self.tables.push(Vec::new());
    }

    /// Record which top-level statement of the innermost block is walked.
    pub fn enter_statement(&mut self, index: usize) -> CompileResult<()> {
        let frame = self.frames.last_mut().ok_or_else(|| {
            CompileError::StructuralInvariant("statement index set outside an allocation".into())
        })?;
        frame.statement = index;
        Ok(())
    }

    /// The innermost open allocation frame.
    pub fn current_allocation(&self) -> Option<&AllocationFrame> {
        self.frames.last()
    }

    /// Register a measurement call with the innermost allocation block.
    ///
    /// Returns the placeholder that replaces the call, or `None` when the
    /// call is not inside any allocation block.
    pub fn record_measurement(&mut self, call: NodeId) -> Option<String> {
        let frame = self.frames.last()?.clone();
        let ordinal = self.tables.last()?.len() + 1;
        let base = format!("{}{ordinal}", self.options.placeholder_prefix);
        let placeholder = self.names.fresh_name(&base);
        self.tables.last_mut()?.push(HoistEntry {
            block: frame.block,
            index: frame.statement,
            call,
            placeholder: placeholder.clone(),
        });
        Some(placeholder)
    }

    /// Close the innermost allocation block and hand back its table.
    pub fn pop_allocation(&mut self, block: NodeId) -> CompileResult<Vec<HoistEntry>> {
        if self.frames.len() != self.tables.len() {
            return Err(CompileError::StructuralInvariant(format!(
                "{} allocation frames but {} hoisting tables",
                self.frames.len(),
                self.tables.len()
            )));
        }
        match (self.frames.pop(), self.tables.pop()) {
            (Some(frame), Some(table)) if frame.block == block => Ok(table),
            (Some(frame), _) => Err(CompileError::StructuralInvariant(format!(
                "closing allocation {block} while {} is innermost",
                frame.block
            ))),
            _ => Err(CompileError::StructuralInvariant(format!(
                "closing allocation {block} with no open frame"
            ))),
        }
    }

    /// Set all open frames aside, e.g. while rewriting a nested definition.
    pub fn suspend_allocations(&mut self) -> SuspendedFrames {
        SuspendedFrames {
            frames: std::mem::take(&mut self.frames),
            tables: std::mem::take(&mut self.tables),
        }
    }

    /// Restore frames set aside by [`suspend_allocations`](Self::suspend_allocations).
    pub fn resume_allocations(&mut self, suspended: SuspendedFrames) -> CompileResult<()> {
        self.check_balanced()?;
        self.frames = suspended.frames;
        self.tables = suspended.tables;
        Ok(())
    }

    /// Fail unless no allocation frame or hoisting table is open.
    pub fn check_balanced(&self) -> CompileResult<()> {
        if self.frames.is_empty() && self.tables.is_empty() {
            Ok(())
        } else {
            Err(CompileError::StructuralInvariant(format!(
                "{} allocation frames and {} hoisting tables left open",
                self.frames.len(),
                self.tables.len()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_outside_allocation_is_not_recorded() {
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        assert!(ctx.record_measurement(NodeId(0)).is_none());
    }

    #[test]
    fn test_frames_and_tables_pop_together() {
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        ctx.push_allocation(NodeId(1));
        ctx.enter_statement(2).unwrap();
        assert_eq!(ctx.record_measurement(NodeId(7)).as_deref(), Some("_m1"));
        assert_eq!(ctx.record_measurement(NodeId(8)).as_deref(), Some("_m2"));

        let table = ctx.pop_allocation(NodeId(1)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].index, 2);
        assert_eq!(table[1].call, NodeId(8));
        ctx.check_balanced().unwrap();
    }

    #[test]
    fn test_nested_blocks_get_distinct_placeholders() {
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        ctx.push_allocation(NodeId(1));
        let outer = ctx.record_measurement(NodeId(10)).unwrap();
        ctx.push_allocation(NodeId(2));
        let inner = ctx.record_measurement(NodeId(11)).unwrap();
        assert_ne!(outer, inner);
        assert_eq!(ctx.pop_allocation(NodeId(2)).unwrap()[0].block, NodeId(2));
        assert_eq!(ctx.pop_allocation(NodeId(1)).unwrap()[0].block, NodeId(1));
    }

    #[test]
    fn test_popping_wrong_block_is_an_invariant_violation() {
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        ctx.push_allocation(NodeId(1));
        let err = ctx.pop_allocation(NodeId(5)).unwrap_err();
        assert!(matches!(err, CompileError::StructuralInvariant(_)));
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut ctx = TranslationContext::new(TranslateOptions::default());
        ctx.push_allocation(NodeId(1));
        let suspended = ctx.suspend_allocations();
        assert_eq!(ctx.allocation_depth(), 0);
        assert!(ctx.record_measurement(NodeId(3)).is_none());
        ctx.resume_allocations(suspended).unwrap();
        assert_eq!(ctx.allocation_depth(), 1);
    }
}
