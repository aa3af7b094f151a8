#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Victory evaluation.

use skirmish_core::{BattleOutcome, BattlePhase, Command, Faction};
use skirmish_world::{query, World};
use tracing::debug;

/// Reports the outcome the current roster implies, if any.
///
/// A side with no living units has lost. When both sides are wiped out the
/// battle is a draw, but only once at least one turn has been played; an empty
/// roster before the first turn is not evaluated. An outcome that was already
/// declared is returned as is.
#[must_use]
pub fn check_victory(world: &World) -> Option<BattleOutcome> {
    if let Some(outcome) = query::outcome(world) {
        return Some(outcome);
    }
    let a_standing = query::living_count(world, Faction::A) > 0;
    let b_standing = query::living_count(world, Faction::B) > 0;
    match (a_standing, b_standing) {
        (true, true) => None,
        (true, false) => Some(BattleOutcome::AWin),
        (false, true) => Some(BattleOutcome::BWin),
        (false, false) if query::turn_number(world) > 0 => Some(BattleOutcome::Draw),
        (false, false) => None,
    }
}

/// Declares the outcome once the battle is decided.
#[derive(Clone, Copy, Debug, Default)]
pub struct VictoryEvaluator;

impl VictoryEvaluator {
    /// Creates the evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Pushes a [`Command::DeclareOutcome`] when the battle has just been decided.
    ///
    /// Returns the outcome, including one declared earlier, so callers can stop
    /// scheduling.
    pub fn handle(&self, world: &World, out: &mut Vec<Command>) -> Option<BattleOutcome> {
        let outcome = check_victory(world)?;
        if !matches!(query::phase(world), BattlePhase::Over(_)) {
            debug!(?outcome, turn = query::turn_number(world), "battle decided");
            out.push(Command::DeclareOutcome { outcome });
        }
        Some(outcome)
    }
}
