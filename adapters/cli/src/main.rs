#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that deploys two armies and narrates the battle between them.

mod config;
mod narration;
mod roster_transfer;

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use skirmish_core::{BattleOutcome, Event, Faction, SeededDice, BOARD_SIZE};
use skirmish_system_deployment::{
    BudgetGenerator, CampaignProgress, Deployment, DeploymentConfig, DeploymentMode,
};
use skirmish_system_progression::{summarize, BattleSummary, Standout};
use skirmish_system_scheduler::{start_battle, Scheduler, SchedulerState};
use skirmish_system_terrain::TerrainGenerator;
use skirmish_world::{self as world, query, World};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{ArmyEntry, CliConfig, ModeSetting},
    narration::Narrate,
    roster_transfer::RosterSnapshot,
};

/// Generator attempts spent per army before giving up on leftover points.
const DEPLOYMENT_ATTEMPTS: u32 = 1000;

#[derive(Parser, Debug)]
#[command(
    name = "skirmish",
    about = "Runs a turn-based battle between the Crown and the Horde"
)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for every random roll
    #[arg(long)]
    seed: Option<u64>,

    /// How the armies are assembled
    #[arg(long, value_enum)]
    mode: Option<ModeSetting>,

    /// Points each army may spend
    #[arg(long)]
    budget: Option<u32>,

    /// Turn after which the battle ends in a stalemate
    #[arg(long)]
    max_turns: Option<u32>,

    /// Pause after each unit action, in milliseconds
    #[arg(long)]
    action_delay_ms: Option<u64>,

    /// Pause between turns, in milliseconds
    #[arg(long)]
    turn_delay_ms: Option<u64>,

    /// Campaign levels to play
    #[arg(long)]
    levels: Option<u32>,

    /// Roster transfer string for the Crown army
    #[arg(long)]
    army: Option<String>,

    /// Roster transfer string for the Horde army in two-player mode
    #[arg(long)]
    opponent: Option<String>,

    /// Print the deployed rosters as transfer strings
    #[arg(long)]
    export: bool,

    /// Print the battle summary as JSON
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(&self, config: &mut CliConfig) {
        config.seed = self.seed.or(config.seed);
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(budget) = self.budget {
            config.budget = budget;
        }
        if let Some(max_turns) = self.max_turns {
            config.max_turns = max_turns;
        }
        if let Some(delay) = self.action_delay_ms {
            config.action_delay_ms = delay;
        }
        if let Some(delay) = self.turn_delay_ms {
            config.turn_delay_ms = delay;
        }
        if let Some(levels) = self.levels {
            config.levels = levels;
        }
    }
}

/// Entry point for the skirmish command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = match &args.config {
        Some(path) => CliConfig::load(path).context("failed to load configuration")?,
        None => CliConfig::default(),
    };
    args.apply(&mut config);

    let army = args
        .army
        .as_deref()
        .map(RosterSnapshot::decode)
        .transpose()
        .context("invalid --army roster")?;
    let opponent = args
        .opponent
        .as_deref()
        .map(RosterSnapshot::decode)
        .transpose()
        .context("invalid --opponent roster")?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, mode = ?config.mode, "skirmish starting");

    let host = Host {
        config,
        army,
        opponent,
        export: args.export,
        json: args.json,
    };
    let mut dice = SeededDice::new(seed);
    match host.config.mode {
        ModeSetting::Single => {
            let mode = DeploymentMode::Single {
                opponent_budget: host.config.budget,
            };
            let _ = host.battle(&mode, host.config.budget, &mut dice)?;
        }
        ModeSetting::TwoPlayer => {
            let _ = host.battle(&DeploymentMode::TwoPlayer, host.config.budget, &mut dice)?;
        }
        ModeSetting::Campaign => host.campaign(&mut dice)?,
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct Host {
    config: CliConfig,
    army: Option<RosterSnapshot>,
    opponent: Option<RosterSnapshot>,
    export: bool,
    json: bool,
}

impl Host {
    fn campaign(&self, dice: &mut SeededDice) -> Result<()> {
        let mut progress = CampaignProgress::new();
        for _ in 0..self.config.levels {
            let level = progress.level();
            println!("=== Campaign level {level} ===");
            let (world, outcome) = self.battle(&progress.mode(), progress.player_points(), dice)?;
            progress.record_outcome(&world, outcome);
            if outcome != BattleOutcome::AWin {
                println!("The campaign ends at level {level}.");
                return Ok(());
            }
        }
        println!(
            "Campaign complete: reached level {} with {} veterans and {} heroes.",
            progress.level(),
            progress.veterans().len(),
            progress.total_heroes()
        );
        Ok(())
    }

    fn battle(
        &self,
        mode: &DeploymentMode,
        points: u32,
        dice: &mut SeededDice,
    ) -> Result<(World, BattleOutcome)> {
        let mut world = World::new();
        let mut events = Vec::new();

        let mut commands = Vec::new();
        TerrainGenerator::default().handle(BOARD_SIZE, dice, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        self.deploy(
            &mut world,
            Faction::A,
            points,
            self.army.as_ref(),
            &self.config.army,
            dice,
            &mut events,
        )?;
        if *mode == DeploymentMode::TwoPlayer {
            if self.opponent.is_none() && self.config.opponent.is_empty() {
                bail!("two-player battles need a Horde army (--opponent or [[opponent]] entries)");
            }
            self.deploy(
                &mut world,
                Faction::B,
                self.config.budget,
                self.opponent.as_ref(),
                &self.config.opponent,
                dice,
                &mut events,
            )?;
        }

        let config = DeploymentConfig {
            budget: self.config.budget,
            attempts: DEPLOYMENT_ATTEMPTS,
        };
        start_battle(&mut world, mode, config, dice, &mut events);
        if self.export {
            for faction in Faction::ALL {
                let roster = RosterSnapshot::capture(&world, faction)
                    .encode()
                    .context("failed to encode roster")?;
                println!("{} roster: {roster}", faction.display_name());
            }
        }
        narrate(&events, &world);

        let outcome = self.fight(&mut world, dice)?;
        self.report(&summarize(&world), outcome)?;
        Ok((world, outcome))
    }

    #[allow(clippy::too_many_arguments)]
    fn deploy(
        &self,
        world: &mut World,
        faction: Faction,
        points: u32,
        roster: Option<&RosterSnapshot>,
        entries: &[ArmyEntry],
        dice: &mut SeededDice,
        events: &mut Vec<Event>,
    ) -> Result<()> {
        if let Some(roster) = roster {
            if roster.faction != faction {
                bail!(
                    "the supplied roster belongs to the {}, not the {}",
                    roster.faction.display_name(),
                    faction.display_name()
                );
            }
            for (entry, error) in roster.deploy(world, points, events) {
                warn!(kind = entry.kind.id(), cell = ?entry.cell, %error, "roster entry refused");
            }
            return Ok(());
        }

        if !entries.is_empty() {
            let _ = place_entries(world, faction, points, entries, events)?;
            return Ok(());
        }

        let generator = BudgetGenerator::new(DeploymentConfig {
            budget: points,
            attempts: DEPLOYMENT_ATTEMPTS,
        });
        let mut commands = Vec::new();
        let spent = generator.handle(world, faction, points, dice, &mut commands);
        for command in commands {
            world::apply(world, command, events);
        }
        info!(faction = faction.display_name(), spent, "army generated");
        Ok(())
    }

    fn fight(&self, world: &mut World, dice: &mut SeededDice) -> Result<BattleOutcome> {
        let mut scheduler = Scheduler::new(self.config.battle());
        let mut events = Vec::new();
        loop {
            events.clear();
            let state = scheduler
                .step(world, dice, &mut events)
                .context("battle step failed")?;
            narrate(&events, world);
            match state {
                SchedulerState::BattleOver => {
                    return query::outcome(world).context("battle ended without an outcome");
                }
                SchedulerState::TurnStart => pause(self.config.turn_delay_ms),
                SchedulerState::Idle | SchedulerState::UnitActing | SchedulerState::TurnEnd => {
                    pause(self.config.action_delay_ms);
                }
            }
        }
    }

    fn report(&self, summary: &BattleSummary, outcome: BattleOutcome) -> Result<()> {
        if self.json {
            #[derive(Serialize)]
            struct Report<'a> {
                outcome: BattleOutcome,
                summary: &'a BattleSummary,
            }
            let json = serde_json::to_string_pretty(&Report { outcome, summary })
                .context("failed to serialise the summary")?;
            println!("{json}");
            return Ok(());
        }

        println!("--- Battle Summary ---");
        println!(
            "Units deployed: {}, fallen: {}",
            summary.total_deployed, summary.total_lost
        );
        println!(
            "Damage dealt: {} (highest hit {}, {} critical hits)",
            summary.total_damage, summary.highest_hit, summary.critical_hits
        );
        let standouts = [
            ("Most damage", &summary.most_damage),
            ("Most kills", &summary.most_kills),
            ("Toughest survivor", &summary.toughest_survivor),
            ("Longest survivor", &summary.longest_survivor),
        ];
        for (title, standout) in standouts {
            if let Some(Standout { name, value, .. }) = standout {
                println!("{title}: {name} ({value})");
            }
        }
        if !summary.heroes.is_empty() {
            println!("Heroes: {}", summary.heroes.join(", "));
        }
        Ok(())
    }
}

/// Places configured entries in order until the points no longer buy any unit.
///
/// Returns how many entries made it onto the board.
fn place_entries(
    world: &mut World,
    faction: Faction,
    points: u32,
    entries: &[ArmyEntry],
    events: &mut Vec<Event>,
) -> Result<usize> {
    let mut ledger = Deployment::new(faction, points);
    let mut placed = 0;
    for (kind, cell) in CliConfig::resolve(entries).context("invalid army entry")? {
        if !ledger.can_afford_any() {
            warn!(remaining = ledger.remaining(), "army budget spent, dropping the rest");
            break;
        }
        match ledger.place_for_player(world, kind.id(), cell, events) {
            Ok(_) => placed += 1,
            Err(error) => warn!(kind = kind.id(), ?cell, %error, "army entry refused"),
        }
    }
    Ok(placed)
}

fn narrate(events: &[Event], world: &World) {
    for line in events.iter().filter_map(|event| event.narrate(world)) {
        println!("{line}");
    }
}

fn pause(millis: u64) {
    if millis > 0 {
        thread::sleep(Duration::from_millis(millis));
    }
}
