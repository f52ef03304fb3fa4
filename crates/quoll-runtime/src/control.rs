//! Control aggregates and integer-equality control scopes.
//!
//! Every controlled gate in a translated module fires when all of its
//! control lines read 1. A conditional on `lines == value` is expressed on
//! top of that convention by toggling each line whose bit in `value` is 0,
//! running the controlled body, and toggling the same lines back.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{RuntimeError, RuntimeResult};
use crate::unitary::Unitary2x2;

/// Index of one line inside an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Line(pub u32);

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for Line {
    fn from(index: u32) -> Self {
        Line(index)
    }
}

/// Receives the gates a runtime primitive applies.
pub trait GateSink {
    /// Apply a single-line block to `line`.
    fn apply(&mut self, gate: &Unitary2x2, line: Line) -> RuntimeResult<()>;
}

/// Ordered, duplicate-free set of control lines, all required to be 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllOnesControl {
    lines: Vec<Line>,
}

impl AllOnesControl {
    /// Build an aggregate. Repeated lines keep their first position.
    pub fn new(lines: impl IntoIterator<Item = Line>) -> RuntimeResult<Self> {
        let mut control = Self { lines: Vec::new() };
        control.push_all(lines);
        if control.lines.is_empty() {
            return Err(RuntimeError::EmptyControl);
        }
        Ok(control)
    }

    /// Concatenate with another aggregate.
    #[must_use]
    pub fn and(&self, other: &AllOnesControl) -> AllOnesControl {
        let mut merged = self.clone();
        merged.push_all(other.lines.iter().copied());
        merged
    }

    /// Append lines in place.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = Line>) {
        self.push_all(lines);
    }

    fn push_all(&mut self, lines: impl IntoIterator<Item = Line>) {
        for line in lines {
            if !self.lines.contains(&line) {
                self.lines.push(line);
            }
        }
    }

    /// The control lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of control lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false for a constructed aggregate.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether `line` is one of the controls.
    pub fn contains(&self, line: Line) -> bool {
        self.lines.contains(&line)
    }
}

/// Positions, MSB first, whose bit in `value` is 0.
///
/// Position 0 holds the most significant bit of a `width`-bit number.
pub fn zero_bit_lines(value: u64, width: usize) -> RuntimeResult<Vec<usize>> {
    if width < 64 && value >> width != 0 {
        return Err(RuntimeError::ValueOutOfRange { value, width });
    }
    Ok((0..width)
        .filter(|&position| {
            let shift = width - 1 - position;
            shift >= 64 || (value >> shift) & 1 == 0
        })
        .collect())
}

/// The toggles that turn `lines == value` into an all-ones control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlScope {
    control: AllOnesControl,
    toggles: Vec<Line>,
}

impl ControlScope {
    /// Prepare a scope for the condition `lines == value`.
    pub fn new(lines: &[Line], value: u64) -> RuntimeResult<Self> {
        let control = AllOnesControl::new(lines.iter().copied())?;
        if control.len() != lines.len() {
            return Err(RuntimeError::Unsupported(
                "a line appears twice in a conditional".into(),
            ));
        }
        let toggles = zero_bit_lines(value, lines.len())?
            .into_iter()
            .map(|position| lines[position])
            .collect();
        Ok(Self { control, toggles })
    }

    /// The aggregate the scope body is controlled on.
    pub fn control(&self) -> &AllOnesControl {
        &self.control
    }

    /// Lines flipped on enter and again on exit.
    pub fn toggles(&self) -> &[Line] {
        &self.toggles
    }

    /// Apply the toggles before the body runs.
    pub fn enter(&self, sink: &mut impl GateSink) -> RuntimeResult<&AllOnesControl> {
        debug!("Entering control scope, toggling {} lines", self.toggles.len());
        self.flip(sink)?;
        Ok(&self.control)
    }

    /// Restore the lines after the body ran.
    pub fn exit(&self, sink: &mut impl GateSink) -> RuntimeResult<()> {
        debug!("Leaving control scope, toggling {} lines", self.toggles.len());
        self.flip(sink)
    }

    fn flip(&self, sink: &mut impl GateSink) -> RuntimeResult<()> {
        let toggle = Unitary2x2::x();
        for &line in &self.toggles {
            sink.apply(&toggle, line)?;
        }
        Ok(())
    }
}
