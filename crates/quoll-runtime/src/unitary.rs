//! Single-line unitary blocks.
//!
//! The multiplexer and the control scopes only ever hand 2x2 blocks to a
//! gate sink, so this is the whole matrix vocabulary the runtime needs.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};

/// Tolerance for floating point comparisons.
const EPSILON: f64 = 1e-10;

/// A 2x2 unitary block in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a block from its four elements.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// The identity block.
    pub fn identity() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
        )
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = 1.0 / 2.0_f64.sqrt();
        Self::new(
            Complex64::new(s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(-s, 0.0),
        )
    }

    /// Bit flip, also the anti-control toggle.
    pub fn x() -> Self {
        Self::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
        )
    }

    /// Phase flip.
    pub fn z() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(-1.0, 0.0),
        )
    }

    /// Phase rotation `diag(1, e^{i theta})`.
    pub fn r1(theta: f64) -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::from_polar(1.0, theta),
        )
    }

    /// The block of a preamble gate, looked up by the name translated code
    /// calls it by.
    pub fn named(name: &str, params: &[f64]) -> RuntimeResult<Self> {
        match (name, params) {
            ("X", []) => Ok(Self::x()),
            ("H", []) => Ok(Self::h()),
            ("Z", []) => Ok(Self::z()),
            ("R1", [theta]) => Ok(Self::r1(*theta)),
            _ => Err(RuntimeError::Unsupported(format!(
                "no single-line block for {name} with {} parameters",
                params.len()
            ))),
        }
    }

    /// Matrix product `self * other`.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Element-wise comparison within [`EPSILON`].
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a - b).norm() < EPSILON)
    }

    /// Exactly the identity, phase included.
    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::identity())
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}
