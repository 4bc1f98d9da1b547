//! Random draws behind build decisions
//!
//! Build choices are deliberately randomized so the agent does not lock
//! into one tech path. All draws go through [`DecisionSource`] so tests can
//! force a branch and replays can reuse a seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the random draws used by the selection criteria
pub trait DecisionSource {
    /// Draws `0.01 * uniform{0..=100}` and returns whether it lies below `threshold`
    fn chance_below(&mut self, threshold: f32) -> bool;

    /// Draws a uniform step in `0..steps`
    fn step(&mut self, steps: u32) -> u32;
}

/// Seeded draws for play
#[derive(Debug, Clone)]
pub struct SeededDecisions {
    rng: ChaCha8Rng,
}

impl SeededDecisions {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for SeededDecisions {
    fn default() -> Self {
        Self::new(42)
    }
}

impl DecisionSource for SeededDecisions {
    fn chance_below(&mut self, threshold: f32) -> bool {
        let value = 0.01 * self.rng.gen_range(0..=100u32) as f32;
        value < threshold
    }

    fn step(&mut self, steps: u32) -> u32 {
        if steps == 0 {
            return 0;
        }
        self.rng.gen_range(0..steps)
    }
}

/// Draws that always return the same outcome
///
/// `step` is clamped to the requested range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDecisions {
    pub chance: bool,
    pub step: u32,
}

impl FixedDecisions {
    pub fn new(chance: bool, step: u32) -> Self {
        Self { chance, step }
    }
}

impl DecisionSource for FixedDecisions {
    fn chance_below(&mut self, _threshold: f32) -> bool {
        self.chance
    }

    fn step(&mut self, steps: u32) -> u32 {
        self.step.min(steps.saturating_sub(1))
    }
}
