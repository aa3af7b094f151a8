#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat resolver: damage, critical strikes, splash and special moves.
//!
//! The resolver reads unit state through `skirmish_world::query` and submits
//! every mutation as a command, so later strikes within one action observe the
//! effects of earlier ones.

mod charge;

use skirmish_core::{CellCoord, Command, Dice, EffectKind, Event, UnitId, UnitSnapshot};
use skirmish_world::{self as world, query, World};
use tracing::debug;

pub use charge::ChargeResult;

/// Hit points restored by Holy Mend.
pub const HOLY_MEND_HEAL: i32 = 10;
/// Chebyshev radius searched for Holy Mend patients.
pub const HOLY_MEND_RANGE: u32 = 4;
/// Last Stand only fires while the user has fewer hit points than this.
pub const LAST_STAND_THRESHOLD: i32 = 10;

/// Tunable combat parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatConfig {
    /// Probability that a normal strike is critical.
    pub crit_chance: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self { crit_chance: 0.10 }
    }
}

/// Side effect recorded alongside the main strike of an attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecondaryEffect {
    /// A bystander caught in a splash took damage.
    Splash {
        /// Unit hit by the splash.
        unit: UnitId,
        /// Damage it took.
        amount: u32,
    },
    /// A unit was stunned.
    Stunned(UnitId),
    /// A unit regained hit points.
    Healed {
        /// Unit that was healed.
        unit: UnitId,
        /// Hit points restored.
        amount: u32,
    },
    /// The attacker raised a shield.
    Shielded(UnitId),
    /// The attacker moved as part of the attack.
    Moved {
        /// Tile the attacker ended on.
        to: CellCoord,
    },
}

/// Summary of a resolved attack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttackOutcome {
    /// `false` when the attacker or target was already down.
    pub performed: bool,
    /// Special move that triggered, if any.
    pub special: Option<EffectKind>,
    /// Strikes launched at the primary target.
    pub strikes: u32,
    /// Damage the primary target actually lost.
    pub damage_dealt: u32,
    /// Whether any strike was critical.
    pub critical: bool,
    /// Whether the primary target fell.
    pub target_died: bool,
    /// Additional effects in the order they happened.
    pub secondary: Vec<SecondaryEffect>,
}

impl AttackOutcome {
    fn failed() -> Self {
        Self::default()
    }

    fn performed() -> Self {
        Self {
            performed: true,
            ..Self::default()
        }
    }
}

/// Base damage of a strike before criticals: attack minus defense, at least one.
#[must_use]
pub fn base_damage(attacker: &UnitSnapshot, target: &UnitSnapshot) -> i32 {
    (attacker.attack - target.defense).max(1)
}

/// Reports whether `target` lies within the attacker's range.
///
/// Melee units measure Manhattan distance, ranged units Chebyshev distance.
#[must_use]
pub fn in_range(attacker: &UnitSnapshot, target: CellCoord) -> bool {
    attacker.archetype().reaches(attacker.cell, target)
}

/// Resolves attacks between units.
#[derive(Clone, Debug, Default)]
pub struct CombatResolver {
    config: CombatConfig,
}

impl CombatResolver {
    /// Creates a resolver with the provided tuning.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    /// Resolves one attack action of `attacker` against `target`.
    ///
    /// The special move roll comes first; Charge is excluded because it is
    /// rolled before movement by [`CombatResolver::try_charge`]. Acting with
    /// or against a fallen unit yields an outcome with `performed == false`.
    pub fn resolve_attack<D>(
        &self,
        world: &mut World,
        attacker: UnitId,
        target: UnitId,
        dice: &mut D,
        out_events: &mut Vec<Event>,
    ) -> AttackOutcome
    where
        D: Dice + ?Sized,
    {
        let (Some(striker), Some(victim)) = (living(world, attacker), living(world, target)) else {
            debug!(attacker = attacker.get(), target = target.get(), "attack skipped");
            return AttackOutcome::failed();
        };

        let mut outcome = AttackOutcome::performed();
        let triggered = striker
            .archetype()
            .special
            .filter(|special| special.effect != EffectKind::Charge)
            .filter(|special| dice.chance(special.trigger_chance, "special move"))
            .map(|special| special.effect);

        match triggered {
            Some(EffectKind::LastStand) if striker.hp < LAST_STAND_THRESHOLD => {
                announce(
                    world,
                    &mut outcome,
                    attacker,
                    EffectKind::LastStand,
                    Some(target),
                    out_events,
                );
                let damage = base_damage(&striker, &victim) * 2;
                self.fixed_strike(world, &striker, &victim, damage, &mut outcome, out_events);
            }
            Some(EffectKind::PiercingBolt) => {
                announce(
                    world,
                    &mut outcome,
                    attacker,
                    EffectKind::PiercingBolt,
                    Some(target),
                    out_events,
                );
                self.fixed_strike(
                    world,
                    &striker,
                    &victim,
                    striker.attack,
                    &mut outcome,
                    out_events,
                );
            }
            Some(EffectKind::QuickShot) => {
                announce(
                    world,
                    &mut outcome,
                    attacker,
                    EffectKind::QuickShot,
                    Some(target),
                    out_events,
                );
                for _ in 0..2 {
                    if !self.normal_strike(
                        world,
                        attacker,
                        target,
                        dice,
                        &mut outcome,
                        out_events,
                    ) {
                        break;
                    }
                }
            }
            Some(EffectKind::HolyMend) => match mend_candidate(world, &striker) {
                Some(patient) => {
                    announce(
                        world,
                        &mut outcome,
                        attacker,
                        EffectKind::HolyMend,
                        Some(patient),
                        out_events,
                    );
                    heal(world, Some(attacker), patient, HOLY_MEND_HEAL, &mut outcome, out_events);
                }
                None => {
                    let _ = self.normal_strike(
                        world,
                        attacker,
                        target,
                        dice,
                        &mut outcome,
                        out_events,
                    );
                }
            },
            Some(effect @ (EffectKind::ShieldBash | EffectKind::QuakeSlam)) => {
                announce(world, &mut outcome, attacker, effect, Some(target), out_events);
                if self.normal_strike(world, attacker, target, dice, &mut outcome, out_events) {
                    world::apply(
                        world,
                        Command::Stun {
                            target,
                            by: Some(attacker),
                        },
                        out_events,
                    );
                    outcome.secondary.push(SecondaryEffect::Stunned(target));
                }
            }
            Some(EffectKind::DivineShield) => {
                announce(world, &mut outcome, attacker, EffectKind::DivineShield, None, out_events);
                world::apply(world, Command::RaiseShield { unit: attacker }, out_events);
                outcome.secondary.push(SecondaryEffect::Shielded(attacker));
                let _ = self.normal_strike(world, attacker, target, dice, &mut outcome, out_events);
            }
            Some(EffectKind::Lifesteal) => {
                announce(
                    world,
                    &mut outcome,
                    attacker,
                    EffectKind::Lifesteal,
                    Some(target),
                    out_events,
                );
                let before = outcome.damage_dealt;
                let _ = self.normal_strike(world, attacker, target, dice, &mut outcome, out_events);
                let drained = outcome.damage_dealt - before;
                if drained > 0 {
                    let amount = i32::try_from(drained).unwrap_or(i32::MAX);
                    heal(world, Some(attacker), attacker, amount, &mut outcome, out_events);
                }
            }
            Some(effect) if effect.is_cosmetic() => {
                announce(world, &mut outcome, attacker, effect, Some(target), out_events);
                let _ = self.normal_strike(world, attacker, target, dice, &mut outcome, out_events);
            }
            Some(_) | None => {
                let _ = self.normal_strike(world, attacker, target, dice, &mut outcome, out_events);
            }
        }

        debug!(
            attacker = attacker.get(),
            target = target.get(),
            special = ?outcome.special,
            damage = outcome.damage_dealt,
            killed = outcome.target_died,
            "attack resolved"
        );
        outcome
    }

    /// Launches one strike with a crit roll. Returns whether the target still stands.
    fn normal_strike<D>(
        &self,
        world: &mut World,
        attacker: UnitId,
        target: UnitId,
        dice: &mut D,
        outcome: &mut AttackOutcome,
        out_events: &mut Vec<Event>,
    ) -> bool
    where
        D: Dice + ?Sized,
    {
        let (Some(striker), Some(victim)) = (living(world, attacker), living(world, target)) else {
            return false;
        };
        let base = base_damage(&striker, &victim);
        let critical = dice.chance(self.config.crit_chance, "critical hit");
        let damage = if critical { base * 2 } else { base };
        outcome.critical |= critical;

        if striker.archetype().has_area_attack {
            self.area_strike(world, &striker, &victim, damage, critical, outcome, out_events);
        } else {
            out_events.push(Event::AttackDeclared {
                attacker,
                target,
                projectile: striker.archetype().projectile,
            });
            land(world, Some(attacker), target, damage, critical, outcome, out_events);
        }
        still_standing(world, target)
    }

    /// Launches one strike of predetermined damage without a crit roll.
    fn fixed_strike(
        &self,
        world: &mut World,
        striker: &UnitSnapshot,
        victim: &UnitSnapshot,
        damage: i32,
        outcome: &mut AttackOutcome,
        out_events: &mut Vec<Event>,
    ) {
        out_events.push(Event::AttackDeclared {
            attacker: striker.id,
            target: victim.id,
            projectile: striker.archetype().projectile,
        });
        land(world, Some(striker.id), victim.id, damage, false, outcome, out_events);
    }

    #[allow(clippy::too_many_arguments)]
    fn area_strike(
        &self,
        world: &mut World,
        striker: &UnitSnapshot,
        victim: &UnitSnapshot,
        damage: i32,
        critical: bool,
        outcome: &mut AttackOutcome,
        out_events: &mut Vec<Event>,
    ) {
        let center = victim.cell;
        let affected: Vec<UnitId> = query::living_units(world)
            .into_iter()
            .filter(|unit| unit.cell.chebyshev_distance(center) <= 1)
            .map(|unit| unit.id)
            .collect();
        out_events.push(Event::AreaAttack {
            attacker: striker.id,
            center,
            affected: affected.clone(),
        });

        for unit in affected {
            if unit == victim.id {
                land(world, Some(striker.id), unit, damage * 2, critical, outcome, out_events);
                continue;
            }
            let start = out_events.len();
            world::apply(
                world,
                Command::DealDamage {
                    source: Some(striker.id),
                    target: unit,
                    amount: damage,
                    critical: false,
                },
                out_events,
            );
            let amount = damage_taken(&out_events[start..], unit);
            if amount > 0 {
                outcome.secondary.push(SecondaryEffect::Splash { unit, amount });
            }
        }
    }
}

fn living(world: &World, unit: UnitId) -> Option<UnitSnapshot> {
    query::unit(world, unit).filter(UnitSnapshot::is_alive)
}

fn still_standing(world: &World, unit: UnitId) -> bool {
    living(world, unit).is_some()
}

fn announce(
    world: &World,
    outcome: &mut AttackOutcome,
    unit: UnitId,
    effect: EffectKind,
    target: Option<UnitId>,
    out_events: &mut Vec<Event>,
) {
    debug!(unit = unit.get(), ?effect, turn = query::turn_number(world), "special move");
    outcome.special = Some(effect);
    out_events.push(Event::SpecialMoveUsed {
        unit,
        effect,
        target,
    });
}

/// Deals damage to the primary target and folds the result into `outcome`.
fn land(
    world: &mut World,
    source: Option<UnitId>,
    target: UnitId,
    amount: i32,
    critical: bool,
    outcome: &mut AttackOutcome,
    out_events: &mut Vec<Event>,
) {
    let start = out_events.len();
    world::apply(
        world,
        Command::DealDamage {
            source,
            target,
            amount,
            critical,
        },
        out_events,
    );
    outcome.strikes += 1;
    outcome.damage_dealt += damage_taken(&out_events[start..], target);
    outcome.target_died |= !still_standing(world, target);
}

fn heal(
    world: &mut World,
    source: Option<UnitId>,
    target: UnitId,
    amount: i32,
    outcome: &mut AttackOutcome,
    out_events: &mut Vec<Event>,
) {
    let start = out_events.len();
    world::apply(
        world,
        Command::Heal {
            source,
            target,
            amount,
        },
        out_events,
    );
    let restored = out_events[start..]
        .iter()
        .filter_map(|event| match event {
            Event::UnitHealed { unit, amount, .. } if *unit == target => Some(*amount),
            _ => None,
        })
        .sum();
    outcome.secondary.push(SecondaryEffect::Healed {
        unit: target,
        amount: restored,
    });
}

fn damage_taken(events: &[Event], target: UnitId) -> u32 {
    events
        .iter()
        .filter_map(|event| match event {
            Event::UnitDamaged { unit, amount, .. } if *unit == target => Some(*amount),
            _ => None,
        })
        .sum()
}

/// Picks the living ally, other than the healer, missing the most hit points
/// within Holy Mend range. Ties go to the lowest identifier.
fn mend_candidate(world: &World, healer: &UnitSnapshot) -> Option<UnitId> {
    query::living_units(world)
        .into_iter()
        .filter(|unit| unit.faction == healer.faction && unit.id != healer.id)
        .filter(|unit| unit.missing_hp() > 0)
        .filter(|unit| unit.cell.chebyshev_distance(healer.cell) <= HOLY_MEND_RANGE)
        .fold(None, |best: Option<UnitSnapshot>, unit| match best {
            Some(current) if current.missing_hp() >= unit.missing_hp() => Some(current),
            _ => Some(unit),
        })
        .map(|unit| unit.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{CellCoord, Faction, ScriptedDice, UnitKind};

    fn arena(units: &[(UnitKind, Faction, u32, u32)]) -> (World, Vec<UnitId>) {
        let mut world = World::new();
        let mut events = Vec::new();
        let ids = units
            .iter()
            .map(|&(kind, faction, row, column)| {
                world::place_unit(
                    &mut world,
                    kind,
                    faction,
                    CellCoord::new(row, column),
                    &mut events,
                )
                    .expect("placement succeeds")
            })
            .collect();
        world::apply(&mut world, Command::StartBattle, &mut events);
        (world, ids)
    }

    fn wound(world: &mut World, unit: UnitId, amount: i32) {
        let mut events = Vec::new();
        world::apply(
            world,
            Command::DealDamage {
                source: None,
                target: unit,
                amount,
                critical: false,
            },
            &mut events,
        );
    }

    #[test]
    fn damage_is_attack_minus_defense_with_floor_of_one() {
        let (mut world, ids) = arena(&[
            (UnitKind::Goblin, Faction::B, 5, 5),
            (UnitKind::Ogre, Faction::A, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::never(),
            &mut events,
        );
        assert_eq!(outcome.damage_dealt, 1);
        assert!(!outcome.critical);
        assert_eq!(outcome.strikes, 1);
    }

    #[test]
    fn critical_doubles_damage() {
        let (mut world, ids) = arena(&[
            (UnitKind::Knight, Faction::A, 5, 5),
            (UnitKind::Orc, Faction::B, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let mut dice = ScriptedDice::new([0.9, 0.05], 0.9);
        let outcome = resolver.resolve_attack(&mut world, ids[0], ids[1], &mut dice, &mut events);
        assert_eq!(outcome.damage_dealt, 10);
        assert!(outcome.critical);
        assert_eq!(dice.purposes(), ["special move", "critical hit"]);
    }

    #[test]
    fn fallen_participants_fail_without_events() {
        let (mut world, ids) = arena(&[
            (UnitKind::Knight, Faction::A, 5, 5),
            (UnitKind::Orc, Faction::B, 5, 6),
        ]);
        wound(&mut world, ids[1], 100);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::never(),
            &mut events,
        );
        assert!(!outcome.performed);
        assert!(events.is_empty());
    }

    #[test]
    fn last_stand_doubles_without_crit_roll_when_low() {
        let (mut world, ids) = arena(&[
            (UnitKind::Militia, Faction::A, 5, 5),
            (UnitKind::Orc, Faction::B, 5, 6),
        ]);
        wound(&mut world, ids[0], 12);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let mut dice = ScriptedDice::new([0.0], 0.0);
        let outcome = resolver.resolve_attack(&mut world, ids[0], ids[1], &mut dice, &mut events);
        assert_eq!(outcome.special, Some(EffectKind::LastStand));
        assert_eq!(outcome.damage_dealt, 8);
        assert!(!outcome.critical);
        assert_eq!(dice.purposes(), ["special move"]);
    }

    #[test]
    fn last_stand_at_high_hp_is_a_plain_strike() {
        let (mut world, ids) = arena(&[
            (UnitKind::Militia, Faction::A, 5, 5),
            (UnitKind::Orc, Faction::B, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let mut dice = ScriptedDice::new([0.0, 0.9], 0.9);
        let outcome = resolver.resolve_attack(&mut world, ids[0], ids[1], &mut dice, &mut events);
        assert_eq!(outcome.special, None);
        assert_eq!(outcome.damage_dealt, 4);
    }

    #[test]
    fn piercing_bolt_ignores_defense() {
        let (mut world, ids) = arena(&[
            (UnitKind::Crossbowman, Faction::A, 5, 2),
            (UnitKind::Ogre, Faction::B, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::new([0.0], 0.0),
            &mut events,
        );
        assert_eq!(outcome.damage_dealt, 9);
        assert!(!outcome.critical);
    }

    #[test]
    fn quick_shot_strikes_twice_with_independent_crits() {
        let (mut world, ids) = arena(&[
            (UnitKind::Archer, Faction::A, 5, 2),
            (UnitKind::Ogre, Faction::B, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let mut dice = ScriptedDice::new([0.0, 0.5, 0.01], 0.9);
        let outcome = resolver.resolve_attack(&mut world, ids[0], ids[1], &mut dice, &mut events);

        let declared = events
            .iter()
            .filter(|event| matches!(event, Event::AttackDeclared { .. }))
            .count();
        assert_eq!(declared, 2);
        assert_eq!(outcome.strikes, 2);
        assert_eq!(outcome.damage_dealt, 2 + 4);
        assert_eq!(
            dice.purposes(),
            ["special move", "critical hit", "critical hit"]
        );
    }

    #[test]
    fn shield_bash_stuns_survivors() {
        let (mut world, ids) = arena(&[
            (UnitKind::Knight, Faction::A, 5, 5),
            (UnitKind::Ogre, Faction::B, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::new([0.0], 0.9),
            &mut events,
        );
        assert_eq!(outcome.secondary, vec![SecondaryEffect::Stunned(ids[1])]);
        assert!(query::unit(&world, ids[1]).expect("ogre").skip_next_turn);
    }

    #[test]
    fn holy_mend_heals_most_injured_ally_instead_of_attacking() {
        let (mut world, ids) = arena(&[
            (UnitKind::Cleric, Faction::A, 10, 5),
            (UnitKind::Knight, Faction::A, 10, 7),
            (UnitKind::Militia, Faction::A, 11, 5),
            (UnitKind::Orc, Faction::B, 6, 5),
        ]);
        wound(&mut world, ids[1], 4);
        wound(&mut world, ids[2], 15);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[3],
            &mut ScriptedDice::new([0.0], 0.9),
            &mut events,
        );
        assert_eq!(outcome.strikes, 0);
        assert_eq!(
            outcome.secondary,
            vec![SecondaryEffect::Healed {
                unit: ids[2],
                amount: 10,
            }]
        );
        assert_eq!(query::unit(&world, ids[3]).expect("orc").hp, 35);
    }

    #[test]
    fn holy_mend_without_patients_falls_back_to_a_strike() {
        let (mut world, ids) = arena(&[
            (UnitKind::Cleric, Faction::A, 10, 5),
            (UnitKind::Orc, Faction::B, 6, 5),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::new([0.0], 0.9),
            &mut events,
        );
        assert_eq!(outcome.special, None);
        assert_eq!(outcome.damage_dealt, 4);
    }

    #[test]
    fn divine_shield_absorbs_the_next_hit() {
        let (mut world, ids) = arena(&[
            (UnitKind::Paladin, Faction::A, 5, 5),
            (UnitKind::Ogre, Faction::B, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let _ = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::new([0.0], 0.9),
            &mut events,
        );
        let retaliation = resolver.resolve_attack(
            &mut world,
            ids[1],
            ids[0],
            &mut ScriptedDice::never(),
            &mut events,
        );
        assert_eq!(retaliation.damage_dealt, 0);
        assert_eq!(query::unit(&world, ids[0]).expect("paladin").hp, 50);
        assert!(events.contains(&Event::DamageAbsorbed {
            unit: ids[0],
            prevented: 3,
        }));
    }

    #[test]
    fn lifesteal_heals_attacker_by_damage_dealt() {
        let (mut world, ids) = arena(&[
            (UnitKind::Bloodboy, Faction::B, 5, 5),
            (UnitKind::Militia, Faction::A, 5, 7),
        ]);
        wound(&mut world, ids[0], 20);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::new([0.0], 0.9),
            &mut events,
        );
        assert_eq!(outcome.damage_dealt, 6);
        assert_eq!(query::unit(&world, ids[0]).expect("bloodboy").hp, 16);
    }

    #[test]
    fn area_attack_hits_allies_in_the_blast() {
        let (mut world, ids) = arena(&[
            (UnitKind::Wizard, Faction::A, 9, 5),
            (UnitKind::Orc, Faction::B, 5, 5),
            (UnitKind::Knight, Faction::A, 5, 6),
            (UnitKind::Goblin, Faction::B, 4, 4),
            (UnitKind::Militia, Faction::A, 5, 8),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::never(),
            &mut events,
        );

        assert!(events.contains(&Event::AreaAttack {
            attacker: ids[0],
            center: CellCoord::new(5, 5),
            affected: vec![ids[1], ids[2], ids[3]],
        }));
        assert_eq!(outcome.damage_dealt, 16);
        assert_eq!(
            outcome.secondary,
            vec![
                SecondaryEffect::Splash {
                    unit: ids[2],
                    amount: 8,
                },
                SecondaryEffect::Splash {
                    unit: ids[3],
                    amount: 8,
                },
            ]
        );
        assert_eq!(query::unit(&world, ids[4]).expect("militia").hp, 20);
        let wizard = query::unit(&world, ids[0]).expect("wizard");
        assert_eq!(wizard.record.total_damage_dealt, 16 + 8 + 8);
    }

    #[test]
    fn cosmetic_specials_only_announce() {
        let (mut world, ids) = arena(&[
            (UnitKind::Scout, Faction::A, 5, 5),
            (UnitKind::Orc, Faction::B, 5, 6),
        ]);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            ids[0],
            ids[1],
            &mut ScriptedDice::new([0.0], 0.9),
            &mut events,
        );
        assert_eq!(outcome.special, Some(EffectKind::BlindingDust));
        assert_eq!(outcome.damage_dealt, 3);
        assert!(outcome.secondary.is_empty());
    }

    #[test]
    fn range_metrics_follow_attack_range() {
        let (world, ids) = arena(&[
            (UnitKind::Knight, Faction::A, 5, 5),
            (UnitKind::Archer, Faction::A, 9, 9),
        ]);
        let knight = query::unit(&world, ids[0]).expect("knight");
        let archer = query::unit(&world, ids[1]).expect("archer");
        assert!(!in_range(&knight, CellCoord::new(6, 6)));
        assert!(in_range(&knight, CellCoord::new(5, 6)));
        assert!(in_range(&archer, CellCoord::new(5, 5)));
        assert!(!in_range(&archer, CellCoord::new(4, 9)));
    }
}
