//! Deterministic random number generation for synthetic fact sets.
//!
//! RULE: The synthetic generator never calls any platform RNG.
//! All randomness flows through FactRng streams derived from a single
//! master seed.
//!
//! Each fact kind gets its own stream, seeded from
//! (master_seed XOR stream_index). Adding a stream never changes the
//! values drawn by existing ones.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG for one fact stream.
pub struct FactRng {
    inner: Pcg64Mcg,
}

impl FactRng {
    pub fn new(master_seed: u64, stream: FactStream) -> Self {
        let derived_seed = master_seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [lo, hi).
    pub fn between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries — only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum FactStream {
    CohortSize = 0,
    Retention  = 1,
    Ltv        = 2,
    Spend      = 3,
}
