#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hero promotion and end-of-battle statistics.

use serde::Serialize;
use skirmish_core::{Command, Dice, UnitId, UnitSnapshot};
use skirmish_world::{query, World};
use tracing::debug;

/// Names handed out to promoted heroes.
pub const HERO_NAMES: [&str; 12] = [
    "Varn the Ash-Blooded",
    "Serra Ironheart",
    "Durnan the Relentless",
    "Kael of the Dawn",
    "Mira Stormblade",
    "Thane the Unbroken",
    "Lira the Swift",
    "Bramm the Stalwart",
    "Eira the Flame",
    "Garrick the Wolf",
    "Sable the Silent",
    "Torin the Just",
];

/// Thresholds that earn a unit hero status; meeting any one suffices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromotionRules {
    /// Total damage dealt.
    pub damage_dealt: u32,
    /// Kills.
    pub kills: u32,
    /// Turns survived, counted only once the unit has been hurt.
    pub turns_survived: u32,
}

impl Default for PromotionRules {
    fn default() -> Self {
        Self {
            damage_dealt: 20,
            kills: 2,
            turns_survived: 6,
        }
    }
}

impl PromotionRules {
    /// Reports whether the unit qualifies for promotion.
    #[must_use]
    pub fn qualifies(&self, unit: &UnitSnapshot) -> bool {
        let record = unit.record;
        record.total_damage_dealt >= self.damage_dealt
            || record.kills >= self.kills
            || (record.turns_survived >= self.turns_survived && record.has_taken_damage)
    }
}

/// Promotes veterans of the current battle to heroes.
#[derive(Clone, Debug, Default)]
pub struct Progression {
    rules: PromotionRules,
}

impl Progression {
    /// Creates a tracker with the provided thresholds.
    #[must_use]
    pub fn new(rules: PromotionRules) -> Self {
        Self { rules }
    }

    /// Emits a promotion command for every living non-hero unit that qualifies.
    ///
    /// Heroes are never promoted twice, so running the check repeatedly on the
    /// same state yields each promotion once.
    pub fn handle<D>(&self, world: &World, dice: &mut D, out: &mut Vec<Command>)
    where
        D: Dice + ?Sized,
    {
        for unit in query::living_units(world) {
            if unit.is_hero || !self.rules.qualifies(&unit) {
                continue;
            }
            let hero_name = HERO_NAMES[dice.index(HERO_NAMES.len(), "hero name")].to_owned();
            debug!(
                unit = unit.id.get(),
                hero = %hero_name,
                record = ?unit.record,
                "promotion earned"
            );
            out.push(Command::PromoteHero {
                unit: unit.id,
                hero_name,
            });
        }
    }
}

/// A unit singled out in the battle summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Standout {
    /// Unit identifier.
    pub unit: UnitId,
    /// Display name, the hero name once promoted.
    pub name: String,
    /// Figure the unit was singled out for.
    pub value: u32,
}

impl Standout {
    fn of(unit: &UnitSnapshot, value: u32) -> Self {
        Self {
            unit: unit.id,
            name: unit.display_name().to_owned(),
            value,
        }
    }
}

/// End-of-battle statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BattleSummary {
    /// Units placed on the battlefield.
    pub total_deployed: u32,
    /// Units that fell.
    pub total_lost: u32,
    /// Unit that dealt the most damage.
    pub most_damage: Option<Standout>,
    /// Surviving unit that absorbed the most damage.
    pub toughest_survivor: Option<Standout>,
    /// Unit with the most kills.
    pub most_kills: Option<Standout>,
    /// Unit that stayed in the fight for the most turns.
    pub longest_survivor: Option<Standout>,
    /// Names of every hero, in unit order.
    pub heroes: Vec<String>,
    /// Damage dealt across the battle.
    pub total_damage: u32,
    /// Largest single hit.
    pub highest_hit: u32,
    /// Critical strikes landed.
    pub critical_hits: u32,
}

/// Builds the end-of-battle summary from the world's roster and graveyard.
///
/// Ties go to the unit with the lowest identifier; zero figures produce no standout.
#[must_use]
pub fn summarize(world: &World) -> BattleSummary {
    let mut everyone = query::units(world);
    everyone.extend(query::fallen_units(world));
    everyone.sort_by_key(|unit| unit.id);

    let survivors: Vec<UnitSnapshot> = everyone
        .iter()
        .filter(|unit| unit.is_alive())
        .cloned()
        .collect();
    let tallies = query::tallies(world);

    BattleSummary {
        total_deployed: tallies.deployed,
        total_lost: tallies.lost,
        most_damage: standout(&everyone, |unit| unit.record.total_damage_dealt),
        toughest_survivor: standout(&survivors, |unit| unit.record.damage_taken),
        most_kills: standout(&everyone, |unit| unit.record.kills),
        longest_survivor: standout(&everyone, |unit| unit.record.turns_survived),
        heroes: everyone
            .iter()
            .filter(|unit| unit.is_hero)
            .map(|unit| unit.display_name().to_owned())
            .collect(),
        total_damage: tallies.total_damage,
        highest_hit: tallies.highest_hit,
        critical_hits: tallies.critical_hits,
    }
}

fn standout<F>(units: &[UnitSnapshot], metric: F) -> Option<Standout>
where
    F: Fn(&UnitSnapshot) -> u32,
{
    units
        .iter()
        .map(|unit| (unit, metric(unit)))
        .filter(|(_, value)| *value > 0)
        .fold(None::<(&UnitSnapshot, u32)>, |best, (unit, value)| match best {
            Some((_, top)) if top >= value => best,
            _ => Some((unit, value)),
        })
        .map(|(unit, value)| Standout::of(unit, value))
}
