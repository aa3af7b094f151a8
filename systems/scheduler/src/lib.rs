#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn scheduler driving a battle from deployment to its outcome.
//!
//! Each call to [`Scheduler::step`] performs one transition of the state
//! machine and applies its commands to the world immediately, so a battle can
//! be paced by the host or aborted between any two steps.

mod order;

use std::collections::VecDeque;

use skirmish_core::{
    BattleOutcome, BattlePhase, Command, Dice, EffectKind, Event, Faction, UnitId, UnitSnapshot,
};
use skirmish_system_combat::{in_range, ChargeResult, CombatConfig, CombatResolver};
use skirmish_system_deployment::{
    muster_veterans, BudgetGenerator, DeploymentConfig, DeploymentMode,
};
use skirmish_system_pathfinding::{blocking_rule, Pathfinder};
use skirmish_system_progression::{Progression, PromotionRules};
use skirmish_system_victory::VictoryEvaluator;
use skirmish_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use order::turn_order;

/// Battle-wide tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BattleConfig {
    /// Turns played before the battle is called a stalemate.
    pub max_turns: u32,
    /// Probability that a normal strike is critical.
    pub crit_chance: f64,
    /// Records that earn a unit hero status.
    pub promotion: PromotionRules,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_turns: 200,
            crit_chance: 0.10,
            promotion: PromotionRules::default(),
        }
    }
}

/// States of the turn scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Deployment is done; the battle has not started.
    #[default]
    Idle,
    /// A new turn is about to begin.
    TurnStart,
    /// Units are taking their actions.
    UnitActing,
    /// Every unit has acted; cleanup is pending.
    TurnEnd,
    /// Terminal state.
    BattleOver,
}

/// Reasons the scheduler refuses to advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The battle already has an outcome.
    #[error("battle is over: {outcome:?}")]
    BattleOver {
        /// Outcome that ended the battle.
        outcome: BattleOutcome,
    },
    /// The battle was torn down before it was decided.
    #[error("battle was aborted")]
    Aborted,
}

/// Turn scheduler state machine.
#[derive(Debug)]
pub struct Scheduler {
    config: BattleConfig,
    state: SchedulerState,
    pending: VecDeque<UnitId>,
    aborted: bool,
    resolver: CombatResolver,
    progression: Progression,
    victory: VictoryEvaluator,
    pathfinder: Pathfinder,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

impl Scheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            state: SchedulerState::Idle,
            pending: VecDeque::new(),
            aborted: false,
            resolver: CombatResolver::new(CombatConfig {
                crit_chance: config.crit_chance,
            }),
            progression: Progression::new(config.promotion),
            victory: VictoryEvaluator::new(),
            pathfinder: Pathfinder::default(),
        }
    }

    /// Current state of the machine.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Units still waiting to act this turn.
    #[must_use]
    pub fn pending(&self) -> Vec<UnitId> {
        self.pending.iter().copied().collect()
    }

    /// Performs one transition and returns the state reached.
    ///
    /// `Idle` starts the battle, `TurnStart` opens a turn, each `UnitActing`
    /// step resolves exactly one unit's action and `TurnEnd` clears the fallen.
    /// Victory is checked after every action and at every turn end. Stepping a
    /// finished or aborted battle is refused.
    pub fn step<D>(
        &mut self,
        world: &mut World,
        dice: &mut D,
        out_events: &mut Vec<Event>,
    ) -> Result<SchedulerState, ScheduleError>
    where
        D: Dice + ?Sized,
    {
        match self.state {
            SchedulerState::Idle => self.start(world, out_events),
            SchedulerState::TurnStart => self.open_turn(world, dice, out_events),
            SchedulerState::UnitActing => self.next_action(world, dice, out_events),
            SchedulerState::TurnEnd => self.close_turn(world, out_events),
            SchedulerState::BattleOver => return Err(self.refusal(world)),
        }
        Ok(self.state)
    }

    /// Steps until the battle is decided and returns its outcome.
    pub fn run_to_completion<D>(
        &mut self,
        world: &mut World,
        dice: &mut D,
        out_events: &mut Vec<Event>,
    ) -> Result<BattleOutcome, ScheduleError>
    where
        D: Dice + ?Sized,
    {
        while self.step(world, dice, out_events)? != SchedulerState::BattleOver {}
        query::outcome(world).ok_or(ScheduleError::Aborted)
    }

    /// Tears the battle down between steps.
    ///
    /// No outcome is declared; later steps are refused with [`ScheduleError::Aborted`].
    pub fn abort(&mut self) {
        if self.state != SchedulerState::BattleOver {
            info!(pending = self.pending.len(), "battle aborted");
            self.aborted = true;
        }
        self.pending.clear();
        self.state = SchedulerState::BattleOver;
    }

    fn refusal(&self, world: &World) -> ScheduleError {
        match query::outcome(world) {
            Some(outcome) if !self.aborted => ScheduleError::BattleOver { outcome },
            _ => ScheduleError::Aborted,
        }
    }

    fn start(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        if query::phase(world) == BattlePhase::Deploying {
            world::apply(world, Command::StartBattle, out_events);
        }
        self.state = SchedulerState::TurnStart;
        let _ = self.settle(world, out_events);
    }

    fn open_turn<D>(&mut self, world: &mut World, dice: &mut D, out_events: &mut Vec<Event>)
    where
        D: Dice + ?Sized,
    {
        if query::turn_number(world) >= self.config.max_turns {
            warn!(turns = self.config.max_turns, "turn limit reached");
            world::apply(
                world,
                Command::DeclareOutcome {
                    outcome: BattleOutcome::Stalemate,
                },
                out_events,
            );
            self.state = SchedulerState::BattleOver;
            return;
        }

        let order = turn_order(&query::living_units(world));
        self.pending = order.iter().copied().collect();
        world::apply(world, Command::BeginTurn { order }, out_events);

        let mut commands = Vec::new();
        self.progression.handle(world, dice, &mut commands);
        for command in commands {
            world::apply(world, command, out_events);
        }
        self.state = SchedulerState::UnitActing;
    }

    fn next_action<D>(&mut self, world: &mut World, dice: &mut D, out_events: &mut Vec<Event>)
    where
        D: Dice + ?Sized,
    {
        let actor = loop {
            let Some(id) = self.pending.pop_front() else {
                self.state = SchedulerState::TurnEnd;
                return;
            };
            match query::unit(world, id) {
                Some(unit) if unit.is_alive() => break unit,
                _ => debug!(unit = id.get(), "skipping fallen unit"),
            }
        };

        self.act(world, &actor, dice, out_events);
        if self.settle(world, out_events) {
            self.pending.clear();
        }
    }

    fn close_turn(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        world::apply(world, Command::EndTurn, out_events);
        self.state = SchedulerState::TurnStart;
        let _ = self.settle(world, out_events);
    }

    /// Declares the outcome once decided; cleans up the fallen first when a
    /// battle ends mid-turn.
    fn settle(&mut self, world: &mut World, out_events: &mut Vec<Event>) -> bool {
        let mut commands = Vec::new();
        if self.victory.handle(world, &mut commands).is_none() {
            return false;
        }
        if self.state == SchedulerState::UnitActing {
            world::apply(world, Command::EndTurn, out_events);
        }
        for command in commands {
            world::apply(world, command, out_events);
        }
        self.state = SchedulerState::BattleOver;
        true
    }

    fn act<D>(
        &mut self,
        world: &mut World,
        actor: &UnitSnapshot,
        dice: &mut D,
        out_events: &mut Vec<Event>,
    ) where
        D: Dice + ?Sized,
    {
        if actor.skip_next_turn {
            world::apply(world, Command::SkipTurn { unit: actor.id }, out_events);
            return;
        }
        let Some(enemy) = nearest_enemy(world, actor) else {
            out_events.push(Event::NoTarget { unit: actor.id });
            return;
        };

        if actor.archetype().special_effect() == Some(EffectKind::Charge) {
            let charge = self
                .resolver
                .try_charge(world, actor.id, enemy.id, dice, out_events);
            if let ChargeResult::Resolved(_) = charge {
                return;
            }
        }

        if in_range(actor, enemy.cell) {
            let _ = self
                .resolver
                .resolve_attack(world, actor.id, enemy.id, dice, out_events);
            return;
        }

        let archetype = actor.archetype();
        let path = {
            let size = query::battlefield(world).size();
            let obstacles = blocking_rule(world, actor);
            self.pathfinder.find_path_to(size, actor.cell, obstacles, |cell| {
                archetype.reaches(cell, enemy.cell)
            })
        };
        let Some(mut path) = path.filter(|path| !path.is_empty()) else {
            debug!(unit = actor.id.get(), target = enemy.id.get(), "no route to target");
            out_events.push(Event::HeldPosition { unit: actor.id });
            return;
        };
        path.truncate(usize::try_from(archetype.speed).unwrap_or(usize::MAX));
        world::apply(
            world,
            Command::MoveUnit {
                unit: actor.id,
                path,
            },
            out_events,
        );

        let arrived = query::unit(world, actor.id).filter(|unit| in_range(unit, enemy.cell));
        if arrived.is_some() {
            let _ = self
                .resolver
                .resolve_attack(world, actor.id, enemy.id, dice, out_events);
        }
    }
}

/// Closest living enemy of `unit` under its range metric; ties go to the lowest id.
#[must_use]
pub fn nearest_enemy(world: &World, unit: &UnitSnapshot) -> Option<UnitSnapshot> {
    query::living_units(world)
        .into_iter()
        .filter(|other| other.faction != unit.faction)
        .min_by_key(|other| (unit.range_distance(other.cell), other.id))
}

/// Finishes deployment for `mode` and starts the battle.
///
/// Campaign veterans rejoin faction A on the first free tiles of its rows.
/// Modes with a generated opponent fill faction B from its budget when the
/// host has not deployed any faction B units.
pub fn start_battle<D>(
    world: &mut World,
    mode: &DeploymentMode,
    config: DeploymentConfig,
    dice: &mut D,
    out_events: &mut Vec<Event>,
) where
    D: Dice + ?Sized,
{
    if query::phase(world) != BattlePhase::Deploying {
        warn!("battle already started");
        return;
    }
    if !mode.veterans().is_empty() {
        let mustered = muster_veterans(world, mode.veterans(), out_events);
        info!(veterans = mustered.len(), "veterans rejoin the line");
    }
    let horde_deployed = query::living_count(world, Faction::B) > 0;
    if let (Some(budget), false) = (mode.opponent_budget(), horde_deployed) {
        let mut commands = Vec::new();
        let _ = BudgetGenerator::new(config).handle(world, Faction::B, budget, dice, &mut commands);
        for command in commands {
            world::apply(world, command, out_events);
        }
    }
    world::apply(world, Command::StartBattle, out_events);
}
