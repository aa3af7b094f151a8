//! Randomness seam shared by every system that rolls.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Source of uniform rolls in `[0, 1)`.
///
/// Every roll carries a short `purpose` label so traces and scripted tests can
/// tell which decision consumed which value.
pub trait Dice {
    /// Produces the next roll in `[0, 1)`.
    fn roll(&mut self, purpose: &str) -> f64;

    /// Returns `true` when the next roll lands strictly below `probability`.
    fn chance(&mut self, probability: f64, purpose: &str) -> bool {
        self.roll(purpose) < probability
    }

    /// Picks an index in `0..len`; returns zero for empty ranges.
    fn index(&mut self, len: usize, purpose: &str) -> usize {
        if len == 0 {
            return 0;
        }
        let scaled = (self.roll(purpose) * len as f64) as usize;
        scaled.min(len - 1)
    }

    /// Picks an integer in the inclusive range `low..=high`.
    fn between(&mut self, low: u32, high: u32, purpose: &str) -> u32 {
        if high <= low {
            return low;
        }
        let span = (high - low + 1) as usize;
        low + self.index(span, purpose) as u32
    }
}

/// Reproducible dice backed by a ChaCha stream.
#[derive(Clone, Debug)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Creates dice whose rolls are fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, purpose: &str) -> f64 {
        let value: f64 = self.rng.gen();
        trace!(purpose, value, "dice roll");
        value
    }
}

/// Dice that replay a fixed script, then repeat a fallback value.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    script: VecDeque<f64>,
    fallback: f64,
    consumed: Vec<String>,
}

impl ScriptedDice {
    /// Creates dice that yield `script` in order and then `fallback` forever.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
            consumed: Vec::new(),
        }
    }

    /// Dice that never trigger a probabilistic effect.
    #[must_use]
    pub fn never() -> Self {
        Self::new([], 0.999)
    }

    /// Purposes of every roll made so far, in order.
    #[must_use]
    pub fn purposes(&self) -> &[String] {
        &self.consumed
    }

    /// Number of scripted values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, purpose: &str) -> f64 {
        let value = self.script.pop_front().unwrap_or(self.fallback);
        trace!(purpose, value, "scripted roll");
        self.consumed.push(purpose.to_owned());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{Dice, ScriptedDice, SeededDice};

    #[test]
    fn seeded_dice_are_reproducible() {
        let mut first = SeededDice::new(42);
        let mut second = SeededDice::new(42);
        for _ in 0..32 {
            assert_eq!(first.roll("a"), second.roll("b"));
        }
    }

    #[test]
    fn seeded_rolls_stay_in_unit_interval() {
        let mut dice = SeededDice::new(7);
        for _ in 0..256 {
            let value = dice.roll("range");
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn scripted_dice_replay_then_fall_back() {
        let mut dice = ScriptedDice::new([0.0, 0.5], 0.9);
        assert!(dice.chance(0.1, "special"));
        assert!(!dice.chance(0.1, "crit"));
        assert_eq!(dice.roll("extra"), 0.9);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(dice.purposes(), ["special", "crit", "extra"]);
    }

    #[test]
    fn index_and_between_respect_bounds() {
        let mut dice = ScriptedDice::new([0.0, 0.9999, 0.5], 0.0);
        assert_eq!(dice.index(4, "low"), 0);
        assert_eq!(dice.index(4, "high"), 3);
        assert_eq!(dice.between(10, 20, "mid"), 15);
        assert_eq!(dice.index(0, "empty"), 0);
        assert_eq!(dice.between(5, 5, "flat"), 5);
    }
}
