//! Cavalry charge along a clear straight line.

use skirmish_core::{CellCoord, Command, Dice, EffectKind, Event, UnitId, UnitSnapshot};
use skirmish_world::{self as world, query, World};
use tracing::debug;

use crate::{
    announce, base_damage, in_range, land, living, AttackOutcome, CombatResolver, SecondaryEffect,
};

/// Longest line, in tiles, a charge can cover.
const CHARGE_REACH: u32 = 3;
/// Extra damage a charge carries into its target.
const CHARGE_BONUS: i32 = 10;
/// Tiles a charge that cannot kill advances before striking.
const CHARGE_ADVANCE: usize = 2;

/// Result of a charge attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChargeResult {
    /// The charge did not fire; the unit acts normally.
    NotTriggered,
    /// The charge replaced the unit's action.
    Resolved(AttackOutcome),
}

impl CombatResolver {
    /// Rolls and, when it fires, resolves a charge by `attacker` at `target`.
    ///
    /// A charge needs a straight orthogonal or diagonal line of at most three
    /// tiles with nothing standing between the two units. When the charge bonus
    /// is enough to kill, the target takes lethal damage and the attacker rides
    /// onto its tile; otherwise the attacker advances up to two tiles and strikes
    /// normally. A charge that cannot kill and whose advance would not end within
    /// striking range does not fire, leaving the unit to move and attack as usual.
    pub fn try_charge<D>(
        &self,
        world: &mut World,
        attacker: UnitId,
        target: UnitId,
        dice: &mut D,
        out_events: &mut Vec<Event>,
    ) -> ChargeResult
    where
        D: Dice + ?Sized,
    {
        let (Some(rider), Some(victim)) = (living(world, attacker), living(world, target)) else {
            return ChargeResult::NotTriggered;
        };
        let Some(special) = rider
            .archetype()
            .special
            .filter(|special| special.effect == EffectKind::Charge)
        else {
            return ChargeResult::NotTriggered;
        };
        if !dice.chance(special.trigger_chance, "special move") {
            return ChargeResult::NotTriggered;
        }
        let Some(lane) = charge_lane(world, &rider, victim.cell) else {
            debug!(unit = attacker.get(), "charge lane blocked");
            return ChargeResult::NotTriggered;
        };

        let impact = base_damage(&rider, &victim) + CHARGE_BONUS;
        let lethal = impact >= victim.hp;
        let advance: Vec<CellCoord> = lane.iter().copied().take(CHARGE_ADVANCE).collect();
        let landing = advance.last().copied().unwrap_or(rider.cell);
        if !lethal && !rider.archetype().reaches(landing, victim.cell) {
            debug!(unit = attacker.get(), "charge would stop out of reach");
            return ChargeResult::NotTriggered;
        }

        let mut outcome = AttackOutcome::performed();
        announce(world, &mut outcome, attacker, EffectKind::Charge, Some(target), out_events);

        if lethal {
            out_events.push(Event::AttackDeclared {
                attacker,
                target,
                projectile: rider.archetype().projectile,
            });
            land(world, Some(attacker), target, impact, false, &mut outcome, out_events);
            let mut path = lane;
            if outcome.target_died {
                path.push(victim.cell);
            }
            ride(world, attacker, path, &mut outcome, out_events);
        } else {
            ride(world, attacker, advance, &mut outcome, out_events);
            let in_reach =
                living(world, attacker).is_some_and(|rider| in_range(&rider, victim.cell));
            if in_reach {
                let _ = self.normal_strike(world, attacker, target, dice, &mut outcome, out_events);
            }
        }
        ChargeResult::Resolved(outcome)
    }
}

fn ride(
    world: &mut World,
    unit: UnitId,
    path: Vec<CellCoord>,
    outcome: &mut AttackOutcome,
    out_events: &mut Vec<Event>,
) {
    if path.is_empty() {
        return;
    }
    world::apply(world, Command::MoveUnit { unit, path }, out_events);
    if let Some(rider) = query::unit(world, unit) {
        outcome.secondary.push(SecondaryEffect::Moved { to: rider.cell });
    }
}

/// Tiles strictly between the rider and `target` when they form a clear line.
fn charge_lane(world: &World, rider: &UnitSnapshot, target: CellCoord) -> Option<Vec<CellCoord>> {
    let row_delta = i64::from(target.row()) - i64::from(rider.cell.row());
    let column_delta = i64::from(target.column()) - i64::from(rider.cell.column());
    let straight = row_delta == 0 || column_delta == 0 || row_delta.abs() == column_delta.abs();
    let distance = rider.cell.chebyshev_distance(target);
    if !straight || distance == 0 || distance > CHARGE_REACH {
        return None;
    }

    let step_row = row_delta.signum() as i32;
    let step_column = column_delta.signum() as i32;
    let battlefield = query::battlefield(world);
    let crosses_water = rider.archetype().crosses_water();
    let mut lane = Vec::new();
    let mut cursor = rider.cell;
    for _ in 1..distance {
        cursor = cursor.offset(step_row, step_column, battlefield.size())?;
        if battlefield.is_occupied(cursor) || (!crosses_water && battlefield.is_water(cursor)) {
            return None;
        }
        lane.push(cursor);
    }
    Some(lane)
}
