//! Runs allocation blocks against a mock backend the way translated code does.

use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;

use quoll_runtime::{
    AllOnesControl, Backend, BatchExecutor, ControlScope, GateSink, Line, LineSet,
    MeasurementProxy, Outcome, ProxyCache, RuntimeError, RuntimeResult, Unitary2x2,
    multiplexed_control,
};

/// Returns all-ones for every proxy and counts its invocations.
#[derive(Default)]
struct MockBackend {
    calls: AtomicUsize,
    drop_last: bool,
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn execute(&self, proxies: &[MeasurementProxy]) -> RuntimeResult<Vec<Outcome>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut outcomes: Vec<Outcome> = proxies
            .iter()
            .map(|proxy| Outcome::from_counts([("1".repeat(proxy.lines.len()), 1024)]))
            .collect();
        if self.drop_last {
            outcomes.pop();
        }
        Ok(outcomes)
    }
}

/// Simulates classical basis states, enough to watch toggles.
struct BasisState(Vec<bool>);

impl GateSink for BasisState {
    fn apply(&mut self, gate: &Unitary2x2, line: Line) -> RuntimeResult<()> {
        if !gate.approx_eq(&Unitary2x2::x()) {
            return Err(RuntimeError::Unsupported("only toggles".into()));
        }
        let bit = &mut self.0[line.0 as usize];
        *bit = !*bit;
        Ok(())
    }
}

#[test]
fn test_outcomes_follow_proxy_order() {
    let backend = MockBackend::default();
    let mut cache = ProxyCache::new(3);
    let a = cache.proxy(LineSet::new([Line(0)])).unwrap();
    let b = cache.proxy(LineSet::new([Line(1), Line(2)])).unwrap();

    let mut executor = BatchExecutor::new(&backend);
    let outcomes = executor.execute(&[a, b]).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].most_frequent(), Some(("1", 1024)));
    assert_eq!(outcomes[1].most_frequent(), Some(("11", 1024)));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_second_execution_refused() {
    let backend = MockBackend::default();
    let mut cache = ProxyCache::new(1);
    let proxy = cache.proxy(LineSet::new([Line(0)])).unwrap();

    let mut executor = BatchExecutor::new(&backend);
    executor.execute(std::slice::from_ref(&proxy)).unwrap();
    assert!(executor.executed());
    assert!(matches!(
        executor.execute(&[proxy]),
        Err(RuntimeError::AlreadyExecuted)
    ));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_batch_refused_without_calling_backend() {
    let backend = MockBackend::default();
    let mut executor = BatchExecutor::new(&backend);
    assert!(matches!(executor.execute(&[]), Err(RuntimeError::EmptyBatch)));
    assert!(!executor.executed());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_missing_outcome_is_an_arity_mismatch() {
    let backend = MockBackend {
        drop_last: true,
        ..MockBackend::default()
    };
    let mut cache = ProxyCache::new(2);
    let proxies = vec![
        cache.proxy(LineSet::new([Line(0)])).unwrap(),
        cache.proxy(LineSet::new([Line(1)])).unwrap(),
    ];

    let mut executor = BatchExecutor::new(&backend);
    assert!(matches!(
        executor.execute(&proxies),
        Err(RuntimeError::ArityMismatch {
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn test_executor_over_trait_object() {
    let backend: Box<dyn Backend> = Box::new(MockBackend::default());
    let mut cache = ProxyCache::new(1);
    let proxy = cache.proxy(LineSet::new([Line(0)])).unwrap();
    let mut executor = BatchExecutor::new(backend.as_ref());
    assert_eq!(executor.execute(&[proxy]).unwrap().len(), 1);
}

#[test]
fn test_control_scope_matches_only_its_value() {
    let lines = [Line(0), Line(1), Line(2)];
    for value in 0..8u64 {
        let scope = ControlScope::new(&lines, 5).unwrap();
        let mut state = BasisState((0..3).map(|i| (value >> (2 - i)) & 1 == 1).collect());
        let before = state.0.clone();

        let control = scope.enter(&mut state).unwrap().clone();
        let fires = control.lines().iter().all(|line| state.0[line.0 as usize]);
        assert_eq!(fires, value == 5, "value {value}");

        scope.exit(&mut state).unwrap();
        assert_eq!(state.0, before);
    }
}

#[test]
fn test_scope_control_merges_with_outer_control() {
    let outer = AllOnesControl::new([Line(3)]).unwrap();
    let scope = ControlScope::new(&[Line(0), Line(1)], 1).unwrap();
    let merged = scope.control().and(&outer);
    assert_eq!(merged.lines(), &[Line(0), Line(1), Line(3)]);
}

proptest! {
    #[test]
    fn prop_multiplexer_has_one_active_block(controls in 0usize..8) {
        let lines: Vec<Line> = (0..controls as u32).map(Line).collect();
        let h = Unitary2x2::named("H", &[]).unwrap();
        let gate = multiplexed_control(&h, &lines, &[Line(controls as u32)]).unwrap();

        prop_assert_eq!(gate.blocks.len(), 1 << controls);
        let active: Vec<usize> = gate
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| !block.is_identity())
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(active, vec![(1usize << controls) - 1]);
    }

    #[test]
    fn prop_scope_toggles_match_zero_bits(width in 1usize..10, seed in any::<u64>()) {
        let value = seed % (1u64 << width);
        let lines: Vec<Line> = (0..width as u32).map(Line).collect();
        let scope = ControlScope::new(&lines, value).unwrap();
        let ones = value.count_ones() as usize;
        prop_assert_eq!(scope.toggles().len(), width - ones);
    }
}
