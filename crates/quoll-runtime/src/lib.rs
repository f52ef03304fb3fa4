//! Quoll Runtime
//!
//! Primitives the translated code calls into: all-ones control aggregates,
//! the control scopes lowered conditionals open, multiplexed control
//! blocks, and the batched measurement path of an allocation block.
//!
//! # Example
//!
//! ```rust
//! use quoll_runtime::{
//!     Backend, BatchExecutor, ControlScope, Line, LineSet, MeasurementProxy, Outcome,
//!     ProxyCache, RuntimeResult,
//! };
//!
//! struct AlwaysZero;
//!
//! impl Backend for AlwaysZero {
//!     fn name(&self) -> &str { "always_zero" }
//!
//!     fn execute(&self, proxies: &[MeasurementProxy]) -> RuntimeResult<Vec<Outcome>> {
//!         Ok(proxies
//!             .iter()
//!             .map(|p| Outcome::from_counts([("0".repeat(p.lines.len()), 100)]))
//!             .collect())
//!     }
//! }
//!
//! // lines == 2 on three lines toggles the first and the last line.
//! let scope = ControlScope::new(&[Line(0), Line(1), Line(2)], 2).unwrap();
//! assert_eq!(scope.toggles(), &[Line(0), Line(2)]);
//!
//! let mut cache = ProxyCache::new(3);
//! let a = cache.proxy(LineSet::new([Line(0)])).unwrap();
//! let b = cache.proxy(LineSet::new([Line(1), Line(2)])).unwrap();
//!
//! let backend = AlwaysZero;
//! let mut executor = BatchExecutor::new(&backend);
//! let outcomes = executor.execute(&[a, b]).unwrap();
//! assert_eq!(outcomes[1].probability("00"), 1.0);
//! ```

pub mod backend;
pub mod control;
pub mod error;
pub mod multiplex;
pub mod proxy;
pub mod unitary;

pub use backend::{Backend, BatchExecutor, Outcome};
pub use control::{AllOnesControl, ControlScope, GateSink, Line, zero_bit_lines};
pub use error::{RuntimeError, RuntimeResult};
pub use multiplex::{MAX_MULTIPLEX_CONTROLS, MultiplexedGate, multiplexed_control};
pub use proxy::{LineSet, MeasurementProxy, ProxyCache, ProxyId};
pub use unitary::Unitary2x2;
