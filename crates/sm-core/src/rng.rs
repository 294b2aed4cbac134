//! Deterministic RNG for formation generators.
//!
//! # Determinism strategy
//!
//! Each macro creation gets its own `SmallRng` seeded by:
//!
//!   seed = engine_seed XOR (macro_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive macro ids uniformly across the seed space.
//! Re-running the same sequence of macro creations with the same engine seed
//! reproduces the same layouts, and creating macros in between does not
//! disturb the layout of the n-th macro.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::MacroId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded RNG handed to formation generators.
pub struct FormationRng(SmallRng);

impl FormationRng {
    /// Seed deterministically from the engine seed and a macro id.
    pub fn new(engine_seed: u64, macro_id: MacroId) -> Self {
        let seed = engine_seed ^ (macro_id.0 as u64).wrapping_mul(MIXING_CONSTANT);
        FormationRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform `f64` in `[-half, half]`; returns 0.0 when `half` is zero.
    #[inline]
    pub fn symmetric(&mut self, half: f64) -> f64 {
        if half > 0.0 {
            self.0.gen_range(-half..=half)
        } else {
            0.0
        }
    }
}
