//! Deferred measurement requests.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::control::Line;
use crate::error::{RuntimeError, RuntimeResult};

/// Ordered lines one measurement reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSet(Vec<Line>);

impl LineSet {
    /// Collect `lines` in measurement order.
    pub fn new(lines: impl IntoIterator<Item = Line>) -> Self {
        Self(lines.into_iter().collect())
    }

    /// The lines, in the order their bits appear in an outcome.
    pub fn lines(&self) -> &[Line] {
        &self.0
    }

    /// Number of lines read.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no line is read.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, line) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{line}")?;
        }
        write!(f, "]")
    }
}

/// Identifier of a proxy inside its allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyId(pub u32);

/// Stand-in for a measurement whose outcome arrives with the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementProxy {
    /// Position of the proxy in its allocation's batch.
    pub id: ProxyId,
    /// Lines the measurement reads.
    pub lines: LineSet,
}

/// Hands out one proxy per distinct line set of an allocation.
#[derive(Debug, Clone, Default)]
pub struct ProxyCache {
    width: u32,
    proxies: FxHashMap<LineSet, MeasurementProxy>,
}

impl ProxyCache {
    /// Cache for an allocation of `width` lines.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            proxies: FxHashMap::default(),
        }
    }

    /// The proxy measuring `lines`, created on first request.
    pub fn proxy(&mut self, lines: LineSet) -> RuntimeResult<MeasurementProxy> {
        if lines.is_empty() {
            return Err(RuntimeError::Unsupported("measurement of no lines".into()));
        }
        if let Some(line) = lines.lines().iter().find(|line| line.0 >= self.width) {
            return Err(RuntimeError::LineOutOfRange {
                line: line.0,
                width: self.width,
            });
        }
        if let Some(proxy) = self.proxies.get(&lines) {
            return Ok(proxy.clone());
        }

        let id = ProxyId(u32::try_from(self.proxies.len()).unwrap_or(u32::MAX));
        let proxy = MeasurementProxy {
            id,
            lines: lines.clone(),
        };
        self.proxies.insert(lines, proxy.clone());
        Ok(proxy)
    }

    /// Number of lines in the allocation.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of distinct proxies handed out.
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Whether no proxy was requested yet.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(indices: &[u32]) -> LineSet {
        LineSet::new(indices.iter().copied().map(Line))
    }

    #[test]
    fn test_same_lines_same_proxy() {
        let mut cache = ProxyCache::new(4);
        let first = cache.proxy(set(&[0, 1])).unwrap();
        let other = cache.proxy(set(&[2])).unwrap();
        let again = cache.proxy(set(&[0, 1])).unwrap();

        assert_eq!(first, again);
        assert_ne!(first.id, other.id);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_order_distinguishes_line_sets() {
        let mut cache = ProxyCache::new(2);
        let a = cache.proxy(set(&[0, 1])).unwrap();
        let b = cache.proxy(set(&[1, 0])).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_line_outside_allocation() {
        let mut cache = ProxyCache::new(2);
        assert!(matches!(
            cache.proxy(set(&[2])),
            Err(RuntimeError::LineOutOfRange { line: 2, width: 2 })
        ));
        assert!(cache.proxy(set(&[])).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(set(&[0, 3]).to_string(), "[q0, q3]");
    }
}
