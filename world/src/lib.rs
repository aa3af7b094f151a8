#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for the skirmish engine.
//!
//! The world owns the battlefield grid, the unit roster, the turn counter and
//! the graveyard of fallen units. Every mutation arrives as a
//! [`Command`](skirmish_core::Command) through [`apply`]; every read goes
//! through [`query`].

mod battlefield;
mod units;

use skirmish_core::{
    BattlePhase, CellCoord, Command, Event, Faction, PlacementError, Terrain, UnitId, UnitKind,
    Veteran, BOARD_SIZE,
};
use tracing::{debug, info, warn};

pub use battlefield::{Battlefield, Tile};
pub use units::BattleTallies;

use units::Unit;

/// Attack granted on promotion.
const HERO_ATTACK_BONUS: i32 = 2;
/// Maximum and current hit points granted on promotion.
const HERO_HP_BONUS: i32 = 5;

/// Represents the authoritative battle state.
#[derive(Clone, Debug)]
pub struct World {
    battlefield: Battlefield,
    units: Vec<Unit>,
    fallen: Vec<Unit>,
    next_unit_id: u32,
    phase: BattlePhase,
    turn_number: u32,
    turn_order: Vec<UnitId>,
    tallies: BattleTallies,
}

impl World {
    /// Creates an empty plain battlefield of the default size awaiting deployment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_battlefield(Battlefield::new(BOARD_SIZE, &[]))
    }

    fn with_battlefield(battlefield: Battlefield) -> Self {
        Self {
            battlefield,
            units: Vec::new(),
            fallen: Vec::new(),
            next_unit_id: 0,
            phase: BattlePhase::Deploying,
            turn_number: 0,
            turn_order: Vec::new(),
            tallies: BattleTallies::default(),
        }
    }

    fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units
            .binary_search_by_key(&id, |unit| unit.id)
            .ok()
            .map(|index| &self.units[index])
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        match self.units.binary_search_by_key(&id, |unit| unit.id) {
            Ok(index) => Some(&mut self.units[index]),
            Err(_) => None,
        }
    }

    fn living_mut(&mut self, id: UnitId, action: &'static str) -> Option<&mut Unit> {
        match self.unit_mut(id) {
            Some(unit) if unit.is_alive() => Some(unit),
            Some(_) => {
                debug!(unit = id.get(), action, "ignoring command for fallen unit");
                None
            }
            None => {
                warn!(unit = id.get(), action, "command references unknown unit");
                None
            }
        }
    }

    fn validate_placement(&self, kind: UnitKind, cell: CellCoord) -> Result<(), PlacementError> {
        if self.phase != BattlePhase::Deploying {
            return Err(PlacementError::BattleInProgress);
        }
        let tile = self.battlefield.tile_at(cell)?;
        if tile.occupant.is_some() {
            return Err(PlacementError::Occupied);
        }
        if tile.terrain == Terrain::Water && !kind.archetype().crosses_water() {
            return Err(PlacementError::Impassable);
        }
        Ok(())
    }

    fn enlist(&mut self, unit: Unit, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.battlefield.place(unit.id, unit.cell) {
            warn!(unit = unit.id.get(), %reason, "validated placement failed");
            return;
        }
        self.next_unit_id += 1;
        self.tallies.deployed += 1;
        out_events.push(Event::UnitPlaced {
            unit: unit.id,
            kind: unit.kind,
            faction: unit.faction,
            cell: unit.cell,
        });
        self.units.push(unit);
    }

    fn walk(&mut self, id: UnitId, path: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        let Some(unit) = self.unit(id).filter(|unit| unit.is_alive()) else {
            debug!(unit = id.get(), "ignoring move for missing or fallen unit");
            return;
        };
        let crosses_water = unit.kind.archetype().crosses_water();
        let adaptive = unit.kind.archetype().is_water_adaptive;
        let from = unit.cell;

        let mut current = from;
        let mut steps = 0;
        for next in path {
            let legal = next.chebyshev_distance(current) == 1
                && self.battlefield.in_bounds(next)
                && !self.battlefield.is_occupied(next)
                && (crosses_water || !self.battlefield.is_water(next));
            if !legal {
                warn!(unit = id.get(), ?next, "truncating move at illegal step");
                break;
            }
            let _ = self.battlefield.vacate(id, current);
            if let Err(reason) = self.battlefield.place(id, next) {
                warn!(unit = id.get(), %reason, "move target became unavailable");
                let _ = self.battlefield.place(id, current);
                break;
            }
            current = next;
            steps += 1;
        }

        if steps == 0 {
            return;
        }

        let landed_in_water = self.battlefield.is_water(current);
        if let Some(unit) = self.unit_mut(id) {
            unit.cell = current;
            if landed_in_water && !adaptive {
                unit.skip_next_turn = true;
            }
        }
        out_events.push(Event::UnitMoved {
            unit: id,
            from,
            to: current,
            steps,
        });
        if landed_in_water && !adaptive {
            out_events.push(Event::UnitSlowed { unit: id });
        }
    }

    fn strike(
        &mut self,
        source: Option<UnitId>,
        target: UnitId,
        amount: i32,
        critical: bool,
        out_events: &mut Vec<Event>,
    ) {
        let Some(victim) = self.living_mut(target, "damage") else {
            return;
        };
        let amount = u32::try_from(amount).unwrap_or(0);
        if victim.shielded {
            victim.shielded = false;
            out_events.push(Event::DamageAbsorbed {
                unit: target,
                prevented: amount,
            });
            return;
        }

        victim.hp = victim.hp.saturating_sub(i32::try_from(amount).unwrap_or(i32::MAX));
        victim.record.damage_taken += amount;
        if amount > 0 {
            victim.record.has_taken_damage = true;
        }
        let died = victim.hp <= 0;
        if died {
            victim.hp = 0;
        }
        let remaining_hp = victim.hp;
        let cell = victim.cell;

        self.tallies.total_damage += amount;
        self.tallies.highest_hit = self.tallies.highest_hit.max(amount);
        if critical {
            self.tallies.critical_hits += 1;
        }

        out_events.push(Event::UnitDamaged {
            unit: target,
            source,
            amount,
            critical,
            remaining_hp,
        });

        let credited = source.filter(|&attacker| attacker != target);
        if let Some(attacker) = credited.and_then(|attacker| self.unit_mut(attacker)) {
            attacker.record.total_damage_dealt += amount;
            if died {
                attacker.record.kills += 1;
            }
        }

        if died {
            let _ = self.battlefield.vacate(target, cell);
            self.tallies.lost += 1;
            debug!(unit = target.get(), killer = ?source, "unit fell");
            out_events.push(Event::UnitDied {
                unit: target,
                killer: source,
            });
        }
    }

    fn living_count(&self, faction: Faction) -> u32 {
        let count = self
            .units
            .iter()
            .filter(|unit| unit.faction == faction && unit.is_alive())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBattlefield { size, terrain } => {
            *world = World::with_battlefield(Battlefield::new(size, &terrain));
            out_events.push(Event::BattlefieldConfigured { size });
        }
        Command::PlaceUnit {
            kind,
            faction,
            cell,
        } => match world.validate_placement(kind, cell) {
            Ok(()) => {
                let id = UnitId::new(world.next_unit_id);
                world.enlist(Unit::recruit(id, kind, faction, cell), out_events);
            }
            Err(reason) => out_events.push(Event::PlacementRejected { kind, cell, reason }),
        },
        Command::ReinstateVeteran { veteran, cell } => {
            let kind = veteran.kind;
            match world.validate_placement(kind, cell) {
                Ok(()) => {
                    let id = UnitId::new(world.next_unit_id);
                    world.enlist(Unit::reinstate(id, veteran, cell), out_events);
                }
                Err(reason) => out_events.push(Event::PlacementRejected { kind, cell, reason }),
            }
        }
        Command::StartBattle => {
            if world.phase != BattlePhase::Deploying {
                warn!(phase = ?world.phase, "battle already started");
                return;
            }
            world.phase = BattlePhase::InProgress;
            let faction_a = world.living_count(Faction::A);
            let faction_b = world.living_count(Faction::B);
            info!(faction_a, faction_b, "battle started");
            out_events.push(Event::BattleStarted {
                faction_a,
                faction_b,
            });
        }
        Command::BeginTurn { order } => {
            if world.phase != BattlePhase::InProgress {
                warn!(phase = ?world.phase, "turn requested outside of battle");
                return;
            }
            world.turn_number += 1;
            for unit in world.units.iter_mut().filter(|unit| unit.is_alive()) {
                unit.record.turns_survived += 1;
            }
            world.turn_order = order.clone();
            debug!(turn = world.turn_number, units = order.len(), "turn started");
            out_events.push(Event::TurnStarted {
                turn: world.turn_number,
                order,
            });
        }
        Command::MoveUnit { unit, path } => world.walk(unit, path, out_events),
        Command::DealDamage {
            source,
            target,
            amount,
            critical,
        } => world.strike(source, target, amount, critical, out_events),
        Command::Heal {
            source,
            target,
            amount,
        } => {
            let Some(patient) = world.living_mut(target, "heal") else {
                return;
            };
            let restored = (patient.hp + amount.max(0)).min(patient.max_hp).max(patient.hp);
            let healed = restored - patient.hp;
            patient.hp = restored;
            out_events.push(Event::UnitHealed {
                unit: target,
                source,
                amount: u32::try_from(healed).unwrap_or(0),
                hp: restored,
            });
        }
        Command::Stun { target, by } => {
            if let Some(unit) = world.living_mut(target, "stun") {
                unit.skip_next_turn = true;
                out_events.push(Event::UnitStunned { unit: target, by });
            }
        }
        Command::SkipTurn { unit } => {
            let Some(skipper) = world.living_mut(unit, "skip") else {
                return;
            };
            if !skipper.skip_next_turn {
                warn!(unit = unit.get(), "skip requested without pending stun or slow");
                return;
            }
            skipper.skip_next_turn = false;
            out_events.push(Event::TurnSkipped { unit });
        }
        Command::RaiseShield { unit } => {
            if let Some(guard) = world.living_mut(unit, "shield") {
                guard.shielded = true;
                out_events.push(Event::ShieldRaised { unit });
            }
        }
        Command::PromoteHero { unit, hero_name } => {
            let Some(candidate) = world.living_mut(unit, "promote") else {
                return;
            };
            if candidate.is_hero {
                debug!(unit = unit.get(), "unit is already a hero");
                return;
            }
            candidate.is_hero = true;
            candidate.hero_name = Some(hero_name.clone());
            candidate.attack += HERO_ATTACK_BONUS;
            candidate.max_hp += HERO_HP_BONUS;
            candidate.hp += HERO_HP_BONUS;
            info!(unit = unit.get(), hero = %hero_name, "hero promoted");
            out_events.push(Event::HeroPromoted { unit, hero_name });
        }
        Command::EndTurn => {
            if world.phase == BattlePhase::Deploying {
                warn!("turn end requested before battle start");
                return;
            }
            let (fallen, standing): (Vec<Unit>, Vec<Unit>) = std::mem::take(&mut world.units)
                .into_iter()
                .partition(|unit| !unit.is_alive());
            world.units = standing;
            let removed: Vec<UnitId> = fallen.iter().map(|unit| unit.id).collect();
            world.fallen.extend(fallen);
            world.turn_order.clear();
            out_events.push(Event::TurnEnded {
                turn: world.turn_number,
                removed,
            });
        }
        Command::DeclareOutcome { outcome } => {
            if let BattlePhase::Over(existing) = world.phase {
                warn!(?existing, ?outcome, "outcome already declared");
                return;
            }
            world.phase = BattlePhase::Over(outcome);
            info!(?outcome, turn = world.turn_number, "battle ended");
            out_events.push(Event::BattleEnded { outcome });
        }
    }
}

/// Places a unit and reports the assigned identifier or the rejection reason.
pub fn place_unit(
    world: &mut World,
    kind: UnitKind,
    faction: Faction,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<UnitId, PlacementError> {
    let expected = UnitId::new(world.next_unit_id);
    apply(
        world,
        Command::PlaceUnit {
            kind,
            faction,
            cell,
        },
        out_events,
    );
    match out_events.last() {
        Some(Event::UnitPlaced { unit, .. }) if *unit == expected => Ok(expected),
        Some(Event::PlacementRejected { reason, .. }) => Err(*reason),
        _ => Err(PlacementError::Occupied),
    }
}

/// Redeploys a campaign veteran and reports the assigned identifier.
pub fn reinstate_veteran(
    world: &mut World,
    veteran: Veteran,
    cell: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<UnitId, PlacementError> {
    let expected = UnitId::new(world.next_unit_id);
    apply(world, Command::ReinstateVeteran { veteran, cell }, out_events);
    match out_events.last() {
        Some(Event::UnitPlaced { unit, .. }) if *unit == expected => Ok(expected),
        Some(Event::PlacementRejected { reason, .. }) => Err(*reason),
        _ => Err(PlacementError::Occupied),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{BattleTallies, Battlefield, World};
    use skirmish_core::{BattleOutcome, BattlePhase, CellCoord, Faction, UnitId, UnitSnapshot};

    /// Provides read-only access to the battlefield grid.
    #[must_use]
    pub fn battlefield(world: &World) -> &Battlefield {
        &world.battlefield
    }

    /// Current lifecycle phase of the battle.
    #[must_use]
    pub fn phase(world: &World) -> BattlePhase {
        world.phase
    }

    /// Outcome of the battle, once declared.
    #[must_use]
    pub fn outcome(world: &World) -> Option<BattleOutcome> {
        world.phase.outcome()
    }

    /// Number of the current or most recent turn; zero before the first turn.
    #[must_use]
    pub fn turn_number(world: &World) -> u32 {
        world.turn_number
    }

    /// Action order of the current turn.
    #[must_use]
    pub fn turn_order(world: &World) -> &[UnitId] {
        &world.turn_order
    }

    /// Snapshot of a unit still on the roster, fallen units included until cleanup.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        world.unit(id).map(super::Unit::snapshot)
    }

    /// Snapshot of a unit whether it is on the roster or already removed.
    #[must_use]
    pub fn any_unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        unit(world, id).or_else(|| {
            world
                .fallen
                .iter()
                .find(|unit| unit.id == id)
                .map(super::Unit::snapshot)
        })
    }

    /// Snapshots of every unit on the roster ordered by identifier.
    #[must_use]
    pub fn units(world: &World) -> Vec<UnitSnapshot> {
        world.units.iter().map(super::Unit::snapshot).collect()
    }

    /// Snapshots of every living unit ordered by identifier.
    #[must_use]
    pub fn living_units(world: &World) -> Vec<UnitSnapshot> {
        world
            .units
            .iter()
            .filter(|unit| unit.is_alive())
            .map(super::Unit::snapshot)
            .collect()
    }

    /// Number of living units fighting for `faction`.
    #[must_use]
    pub fn living_count(world: &World, faction: Faction) -> u32 {
        world.living_count(faction)
    }

    /// Snapshots of units removed from the roster after falling.
    #[must_use]
    pub fn fallen_units(world: &World) -> Vec<UnitSnapshot> {
        world.fallen.iter().map(super::Unit::snapshot).collect()
    }

    /// Living unit standing on the tile, if any.
    #[must_use]
    pub fn unit_at(world: &World, cell: CellCoord) -> Option<UnitSnapshot> {
        let id = world.battlefield.occupant(cell)?;
        let snapshot = unit(world, id);
        if snapshot.is_none() {
            tracing::warn!(unit = id.get(), ?cell, "tile references unit missing from roster");
        }
        snapshot.filter(UnitSnapshot::is_alive)
    }

    /// Running totals for the end-of-battle summary.
    #[must_use]
    pub fn tallies(world: &World) -> BattleTallies {
        world.tallies
    }
}
