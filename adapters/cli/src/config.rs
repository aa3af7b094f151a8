//! TOML configuration for the command-line host.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use skirmish_core::{CellCoord, UnitKind};
use skirmish_system_deployment::DEFAULT_BUDGET;
use skirmish_system_scheduler::BattleConfig;
use thiserror::Error;

/// Way the two armies are assembled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ModeSetting {
    /// The player's army faces a generated horde.
    #[default]
    Single,
    /// Both armies are supplied by the players.
    TwoPlayer,
    /// Consecutive battles against growing hordes with surviving veterans.
    Campaign,
}

/// One unit the player wants deployed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ArmyEntry {
    /// Catalog identifier such as `"knight"`.
    pub(crate) kind: String,
    /// Board row.
    pub(crate) row: u32,
    /// Board column.
    pub(crate) column: u32,
}

impl ArmyEntry {
    pub(crate) fn cell(&self) -> CellCoord {
        CellCoord::new(self.row, self.column)
    }
}

/// Settings read from the configuration file, overridable from the command line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// Seed for every random roll; drawn from entropy when absent.
    pub(crate) seed: Option<u64>,
    /// Deployment mode.
    pub(crate) mode: ModeSetting,
    /// Points each player may spend, and the generated horde's budget in single mode.
    pub(crate) budget: u32,
    /// Turn after which the battle ends in a stalemate.
    pub(crate) max_turns: u32,
    /// Chance that a normal strike is critical.
    pub(crate) crit_chance: f64,
    /// Pause after each unit action, in milliseconds.
    pub(crate) action_delay_ms: u64,
    /// Pause between turns, in milliseconds.
    pub(crate) turn_delay_ms: u64,
    /// Number of campaign levels to play before stopping.
    pub(crate) levels: u32,
    /// Faction A's army. Generated from the budget when empty.
    pub(crate) army: Vec<ArmyEntry>,
    /// Faction B's army in two-player mode.
    pub(crate) opponent: Vec<ArmyEntry>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let battle = BattleConfig::default();
        Self {
            seed: None,
            mode: ModeSetting::default(),
            budget: DEFAULT_BUDGET,
            max_turns: battle.max_turns,
            crit_chance: battle.crit_chance,
            action_delay_ms: 0,
            turn_delay_ms: 0,
            levels: 3,
            army: Vec::new(),
            opponent: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Scheduler settings derived from the configuration.
    pub(crate) fn battle(&self) -> BattleConfig {
        BattleConfig {
            max_turns: self.max_turns,
            crit_chance: self.crit_chance,
            ..BattleConfig::default()
        }
    }

    /// Resolves the army entries into catalog kinds.
    pub(crate) fn resolve(
        entries: &[ArmyEntry],
    ) -> Result<Vec<(UnitKind, CellCoord)>, ConfigError> {
        entries
            .iter()
            .map(|entry| {
                UnitKind::from_id(&entry.kind)
                    .map(|kind| (kind, entry.cell()))
                    .ok_or_else(|| ConfigError::UnknownUnit(entry.kind.clone()))
            })
            .collect()
    }
}

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("could not read {}", .path.display())]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The file is not valid configuration.
    #[error("could not parse {}", .path.display())]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying TOML failure.
        source: toml::de::Error,
    },
    /// An army entry names no catalog unit.
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CliConfig::parse("").expect("empty config parses");
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.budget, 1000);
        assert_eq!(config.max_turns, 200);
    }

    #[test]
    fn armies_and_mode_are_read() {
        let config = CliConfig::parse(
            r#"
            seed = 42
            mode = "two-player"
            action_delay_ms = 250

            [[army]]
            kind = "knight"
            row = 12
            column = 3

            [[opponent]]
            kind = "orc"
            row = 1
            column = 3
            "#,
        )
        .expect("config parses");

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.mode, ModeSetting::TwoPlayer);
        assert_eq!(config.action_delay_ms, 250);
        let army = CliConfig::resolve(&config.army).expect("known units");
        assert_eq!(army, vec![(UnitKind::Knight, CellCoord::new(12, 3))]);
        assert_eq!(config.opponent[0].kind, "orc");
    }

    #[test]
    fn unknown_keys_and_units_are_refused() {
        assert!(CliConfig::parse("budgett = 5").is_err());
        let entries = [ArmyEntry {
            kind: "dragon".to_owned(),
            row: 12,
            column: 0,
        }];
        assert!(matches!(
            CliConfig::resolve(&entries),
            Err(ConfigError::UnknownUnit(kind)) if kind == "dragon"
        ));
    }
}
