//! Collision-free synthetic identifiers.

use rustc_hash::{FxHashMap, FxHashSet};

/// Generates identifiers that are unique within one compilation.
///
/// The first request for a base returns the base itself; later requests
/// append an increasing counter (`base_1`, `base_2`, ...). A candidate that
/// was already handed out, or reserved because the module uses it, is
/// skipped, so every returned identifier is distinct from every other one.
/// Output depends only on the sequence of calls.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    counters: FxHashMap<String, u32>,
    taken: FxHashSet<String>,
}

impl NameGenerator {
    /// Create a generator with nothing taken.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an identifier the module already uses.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// Whether `name` has been reserved or generated.
    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Return a fresh identifier derived from `base`.
    pub fn fresh_name(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            let candidate = if *counter == 0 {
                base.to_string()
            } else {
                format!("{base}_{counter}")
            };
            *counter += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Base name of the `suffix` variant of `name`.
///
/// Private names keep their single leading underscore: `f` gives `_f_adj`,
/// `_f` gives `_f_adj` and `_f_ctl` gives `_f_ctl_adj`.
pub fn variant_base(name: &str, suffix: &str) -> String {
    if name.starts_with('_') {
        format!("{name}_{suffix}")
    } else {
        format!("_{name}_{suffix}")
    }
}
