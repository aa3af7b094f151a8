use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use proptest::prelude::*;
use skirmish_core::{
    BattleOutcome, CellCoord, Command, Dice, Event, Faction, SeededDice, UnitId, BOARD_SIZE,
};
use skirmish_system_deployment::{BudgetGenerator, DeploymentConfig};
use skirmish_system_scheduler::{Scheduler, SchedulerState};
use skirmish_system_terrain::TerrainGenerator;
use skirmish_system_victory::check_victory;
use skirmish_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_battles() {
    let first = replay(0x5eed);
    let second = replay(0x5eed);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.outcome.is_some());
    assert!(!first.events.is_empty());
}

#[test]
fn different_seeds_produce_different_battles() {
    assert_ne!(replay(1).fingerprint(), replay(2).fingerprint());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn turns_increase_and_outcomes_need_an_empty_side(seed in any::<u64>()) {
        let mut dice = SeededDice::new(seed);
        let mut world = armies(&mut dice, 600);
        let mut scheduler = Scheduler::default();
        let mut events = Vec::new();
        let mut last_turn = 0;

        loop {
            let start = events.len();
            let state = scheduler.step(&mut world, &mut dice, &mut events);
            prop_assert!(state.is_ok());

            for event in &events[start..] {
                if let Event::TurnStarted { turn, .. } = event {
                    prop_assert!(*turn > last_turn);
                    last_turn = *turn;
                }
                if let Event::UnitDamaged { remaining_hp, .. } = event {
                    prop_assert!(*remaining_hp >= 0);
                }
            }

            let both_standing = query::living_count(&world, Faction::A) > 0
                && query::living_count(&world, Faction::B) > 0;
            let decided =
                check_victory(&world).filter(|outcome| *outcome != BattleOutcome::Stalemate);
            prop_assert!(!(both_standing && decided.is_some()));

            for unit in query::units(&world) {
                prop_assert!(unit.hp <= unit.max_hp);
            }

            if state == Ok(SchedulerState::BattleOver) {
                break;
            }
        }
        prop_assert!(query::outcome(&world).is_some());
    }
}

fn armies<D: Dice>(dice: &mut D, budget: u32) -> World {
    let mut world = World::new();
    let mut commands = Vec::new();
    TerrainGenerator::default().handle(BOARD_SIZE, dice, &mut commands);
    let mut events = Vec::new();
    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }

    let generator = BudgetGenerator::new(DeploymentConfig {
        budget,
        attempts: 1000,
    });
    for faction in Faction::ALL {
        let _ = generator.handle(&world, faction, budget, dice, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
    }
    world
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut dice = SeededDice::new(seed);
    let mut world = armies(&mut dice, 800);
    let mut scheduler = Scheduler::default();
    let mut events = Vec::new();
    let outcome = scheduler
        .run_to_completion(&mut world, &mut dice, &mut events)
        .ok();

    let mut units: Vec<UnitState> = query::units(&world)
        .into_iter()
        .chain(query::fallen_units(&world))
        .map(|unit| UnitState {
            id: unit.id,
            cell: unit.cell,
            hp: unit.hp,
            hero: unit.hero_name,
            kills: unit.record.kills,
            damage_dealt: unit.record.total_damage_dealt,
        })
        .collect();
    units.sort_by_key(|unit| unit.id);

    let events = events.iter().map(EventRecord::from).collect();
    ReplayOutcome {
        outcome,
        units,
        events,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    outcome: Option<BattleOutcome>,
    units: Vec<UnitState>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct UnitState {
    id: UnitId,
    cell: CellCoord,
    hp: i32,
    hero: Option<String>,
    kills: u32,
    damage_dealt: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    Turn(u32),
    Moved {
        unit: UnitId,
        to: CellCoord,
    },
    Damaged {
        unit: UnitId,
        amount: u32,
        critical: bool,
    },
    Died(UnitId),
    Promoted(UnitId, String),
    Ended(BattleOutcome),
    Other(String),
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::TurnStarted { turn, .. } => Self::Turn(*turn),
            Event::UnitMoved { unit, to, .. } => Self::Moved {
                unit: *unit,
                to: *to,
            },
            Event::UnitDamaged {
                unit,
                amount,
                critical,
                ..
            } => Self::Damaged {
                unit: *unit,
                amount: *amount,
                critical: *critical,
            },
            Event::UnitDied { unit, .. } => Self::Died(*unit),
            Event::HeroPromoted { unit, hero_name } => Self::Promoted(*unit, hero_name.clone()),
            Event::BattleEnded { outcome } => Self::Ended(*outcome),
            other => Self::Other(format!("{other:?}")),
        }
    }
}

#[test]
fn commands_applied_after_the_end_change_nothing() {
    let mut dice = SeededDice::new(3);
    let mut world = armies(&mut dice, 400);
    let mut scheduler = Scheduler::default();
    let mut events = Vec::new();
    let outcome = scheduler
        .run_to_completion(&mut world, &mut dice, &mut events)
        .expect("battle completes");

    let before = query::units(&world);
    let mut late = Vec::new();
    world::apply(&mut world, Command::StartBattle, &mut late);
    world::apply(
        &mut world,
        Command::DeclareOutcome {
            outcome: BattleOutcome::Stalemate,
        },
        &mut late,
    );
    assert!(late.is_empty());
    assert_eq!(query::units(&world), before);
    assert_eq!(query::outcome(&world), Some(outcome));
}
