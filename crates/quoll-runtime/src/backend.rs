//! Backend contract and the once-per-allocation batch executor.
//!
//! Translated code collects every measurement of an allocation block into
//! proxies and runs them in a single call:
//!
//! ```text
//!   proxy(lines) ... proxy(lines) ──→ BatchExecutor::execute ──→ Backend::execute
//!        (cached per line set)           (at most once)            (one outcome per proxy)
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RuntimeError, RuntimeResult};
use crate::proxy::MeasurementProxy;

/// Measured bitstrings of one proxy and how often each occurred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    counts: FxHashMap<String, u64>,
}

impl Outcome {
    /// An outcome with no recorded shots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(bitstring, count)` pairs.
    pub fn from_counts(counts: impl IntoIterator<Item = (String, u64)>) -> Self {
        let mut outcome = Self::new();
        for (bits, count) in counts {
            outcome.insert(bits, count);
        }
        outcome
    }

    /// Add `count` observations of `bits`.
    pub fn insert(&mut self, bits: impl Into<String>, count: u64) {
        *self.counts.entry(bits.into()).or_insert(0) += count;
    }

    /// Times `bits` was observed.
    pub fn get(&self, bits: &str) -> u64 {
        self.counts.get(bits).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Observed frequency of `bits`, zero when nothing was recorded.
    pub fn probability(&self, bits: &str) -> f64 {
        let total = self.total_shots();
        if total == 0 {
            return 0.0;
        }
        self.get(bits) as f64 / total as f64
    }

    /// The most frequent bitstring, ties broken by the smaller string.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(bits, count)| (bits.as_str(), *count))
    }

    /// Every observed bitstring with its count, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(bits, count)| (bits.as_str(), *count))
    }
}

/// Something that can run a batch of measurements.
///
/// # Contract
///
/// - `execute()` returns one outcome per proxy, in proxy order.
/// - Retries and timeouts are the backend's own business.
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Run every proxy of one allocation.
    fn execute(&self, proxies: &[MeasurementProxy]) -> RuntimeResult<Vec<Outcome>>;
}

/// Runs the batch of one allocation block, at most once.
pub struct BatchExecutor<'a, B: Backend + ?Sized> {
    backend: &'a B,
    executed: bool,
}

impl<'a, B: Backend + ?Sized> BatchExecutor<'a, B> {
    /// An executor that has not run yet.
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            executed: false,
        }
    }

    /// Whether the batch already ran.
    pub fn executed(&self) -> bool {
        self.executed
    }

    /// Execute every proxy and pair the outcomes with them in order.
    pub fn execute(&mut self, proxies: &[MeasurementProxy]) -> RuntimeResult<Vec<Outcome>> {
        if self.executed {
            return Err(RuntimeError::AlreadyExecuted);
        }
        if proxies.is_empty() {
            return Err(RuntimeError::EmptyBatch);
        }
        self.executed = true;

        info!(
            "Executing {} measurement proxies on {}",
            proxies.len(),
            self.backend.name()
        );
        let outcomes = self.backend.execute(proxies)?;
        if outcomes.len() != proxies.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: proxies.len(),
                found: outcomes.len(),
            });
        }
        debug!("Backend {} returned {} outcomes", self.backend.name(), outcomes.len());

        Ok(outcomes)
    }
}
