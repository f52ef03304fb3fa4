//! Multiplexed control over a single target line.

use serde::Serialize;
use tracing::debug;

use crate::control::{GateSink, Line};
use crate::error::{RuntimeError, RuntimeResult};
use crate::unitary::Unitary2x2;

/// Largest control count the block table is built for.
pub const MAX_MULTIPLEX_CONTROLS: usize = 20;

/// One block per control pattern, indexed by the pattern read MSB first.
#[derive(Debug, Clone, Serialize)]
pub struct MultiplexedGate {
    /// Control lines, the first one being the most significant bit.
    pub controls: Vec<Line>,
    /// The line every block acts on.
    pub target: Line,
    /// `2^controls.len()` blocks.
    pub blocks: Vec<Unitary2x2>,
}

impl MultiplexedGate {
    /// The inverse multiplexer: every block replaced by its dagger.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        Self {
            controls: self.controls.clone(),
            target: self.target,
            blocks: self.blocks.iter().map(Unitary2x2::dagger).collect(),
        }
    }

    /// Run `self`, then `next`, as one multiplexer over the same lines.
    pub fn then(&self, next: &MultiplexedGate) -> RuntimeResult<Self> {
        if self.controls != next.controls || self.target != next.target {
            return Err(RuntimeError::Unsupported(
                "composing multiplexers over different lines".into(),
            ));
        }
        let blocks = self
            .blocks
            .iter()
            .zip(&next.blocks)
            .map(|(first, second)| *second * *first)
            .collect();
        Ok(Self {
            controls: self.controls.clone(),
            target: self.target,
            blocks,
        })
    }

    /// The block applied when the controls read `pattern`.
    pub fn block(&self, pattern: usize) -> Option<&Unitary2x2> {
        self.blocks.get(pattern)
    }

    /// Apply the block selected by classical control values.
    pub fn apply_for(&self, pattern: usize, sink: &mut impl GateSink) -> RuntimeResult<()> {
        let block = self.block(pattern).ok_or(RuntimeError::ValueOutOfRange {
            value: pattern as u64,
            width: self.controls.len(),
        })?;
        if block.is_identity() {
            return Ok(());
        }
        sink.apply(block, self.target)
    }
}

/// Build the all-ones multiplexer of `gate` over `controls`.
///
/// Every one of the 2^N blocks is the identity except the last, so `gate`
/// fires only when all controls are 1.
pub fn multiplexed_control(
    gate: &Unitary2x2,
    controls: &[Line],
    targets: &[Line],
) -> RuntimeResult<MultiplexedGate> {
    let target = match targets {
        [target] => *target,
        [] => return Err(RuntimeError::Unsupported("multiplexer without a target line".into())),
        _ => {
            return Err(RuntimeError::Unsupported(format!(
                "multiplexed control over {} target lines",
                targets.len()
            )));
        }
    };
    if controls.contains(&target) {
        return Err(RuntimeError::Unsupported(format!(
            "target {target} is also a control line"
        )));
    }
    if controls.len() > MAX_MULTIPLEX_CONTROLS {
        return Err(RuntimeError::Unsupported(format!(
            "{} control lines exceed the multiplexer limit of {MAX_MULTIPLEX_CONTROLS}",
            controls.len()
        )));
    }

    let count = 1usize << controls.len();
    let mut blocks = vec![Unitary2x2::identity(); count];
    blocks[count - 1] = *gate;
    debug!("Multiplexed {} controls into {} blocks", controls.len(), count);

    Ok(MultiplexedGate {
        controls: controls.to_vec(),
        target,
        blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Count(usize);

    impl GateSink for Count {
        fn apply(&mut self, _gate: &Unitary2x2, _line: Line) -> RuntimeResult<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_two_controls() {
        let gate = multiplexed_control(&Unitary2x2::x(), &[Line(0), Line(1)], &[Line(2)]).unwrap();
        assert_eq!(gate.blocks.len(), 4);
        assert!(gate.blocks[..3].iter().all(Unitary2x2::is_identity));
        assert!(gate.blocks[3].approx_eq(&Unitary2x2::x()));
    }

    #[test]
    fn test_no_controls_is_the_gate() {
        let gate = multiplexed_control(&Unitary2x2::h(), &[], &[Line(0)]).unwrap();
        assert_eq!(gate.blocks.len(), 1);
        assert!(gate.blocks[0].approx_eq(&Unitary2x2::h()));
    }

    #[test]
    fn test_multiple_targets_unsupported() {
        let err = multiplexed_control(&Unitary2x2::x(), &[Line(0)], &[Line(1), Line(2)]);
        assert!(matches!(err, Err(RuntimeError::Unsupported(_))));
    }

    #[test]
    fn test_target_among_controls() {
        let err = multiplexed_control(&Unitary2x2::x(), &[Line(0)], &[Line(0)]);
        assert!(matches!(err, Err(RuntimeError::Unsupported(_))));
    }

    #[test]
    fn test_adjoint_undoes_the_gate() {
        let controls = [Line(0), Line(1)];
        let gate = multiplexed_control(&Unitary2x2::r1(0.7), &controls, &[Line(2)]).unwrap();
        let inverse = gate.adjoint();
        assert!(inverse.blocks[3].approx_eq(&Unitary2x2::r1(-0.7)));

        let round_trip = gate.then(&inverse).unwrap();
        assert!(round_trip.blocks.iter().all(Unitary2x2::is_identity));
    }

    #[test]
    fn test_then_requires_same_lines() {
        let a = multiplexed_control(&Unitary2x2::x(), &[Line(0)], &[Line(1)]).unwrap();
        let b = multiplexed_control(&Unitary2x2::x(), &[Line(1)], &[Line(0)]).unwrap();
        assert!(matches!(a.then(&b), Err(RuntimeError::Unsupported(_))));
    }

    #[test]
    fn test_apply_only_fires_on_all_ones() {
        let gate = multiplexed_control(&Unitary2x2::x(), &[Line(0), Line(1)], &[Line(2)]).unwrap();
        let mut sink = Count(0);
        for pattern in 0..4 {
            gate.apply_for(pattern, &mut sink).unwrap();
        }
        assert_eq!(sink.0, 1);
        assert!(gate.apply_for(4, &mut sink).is_err());
    }
}
