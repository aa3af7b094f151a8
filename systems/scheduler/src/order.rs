//! Action order within a turn.

use skirmish_core::{Faction, UnitId, UnitSnapshot};

/// Builds the action order for a turn from the living units.
///
/// Units are grouped by speed, fastest tier first. Inside a tier the two
/// factions alternate, faction A first, each side in identifier order; once
/// one side runs out the rest of the other side follows.
#[must_use]
pub fn turn_order(units: &[UnitSnapshot]) -> Vec<UnitId> {
    let mut living: Vec<&UnitSnapshot> = units.iter().filter(|unit| unit.is_alive()).collect();
    living.sort_by_key(|unit| unit.id);

    let mut speeds: Vec<u32> = living.iter().map(|unit| unit.archetype().speed).collect();
    speeds.sort_unstable_by(|left, right| right.cmp(left));
    speeds.dedup();

    let mut order = Vec::with_capacity(living.len());
    for speed in speeds {
        let tier = |faction: Faction| -> Vec<UnitId> {
            living
                .iter()
                .filter(|unit| unit.faction == faction && unit.archetype().speed == speed)
                .map(|unit| unit.id)
                .collect()
        };
        let crown = tier(Faction::A);
        let horde = tier(Faction::B);
        for index in 0..crown.len().max(horde.len()) {
            order.extend(crown.get(index));
            order.extend(horde.get(index));
        }
    }
    order
}
