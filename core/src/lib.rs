#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the skirmish battle engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Systems and hosts submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values that make up
//! the battle log. Systems read immutable snapshots such as [`UnitSnapshot`]
//! and never touch world state directly.

mod catalog;
mod dice;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    archetype, cheapest_cost, faction_roster, EffectKind, ProjectileKind, SpecialMove,
    UnitArchetype, UnitKind,
};
pub use dice::{Dice, ScriptedDice, SeededDice};

/// Edge length of the square battlefield measured in tiles.
pub const BOARD_SIZE: u32 = 16;

/// Number of rows each faction may deploy into.
pub const DEPLOYMENT_ROWS: u32 = 4;

/// One of the two opposing sides in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// The side that deploys along the bottom rows and acts first in each speed tier.
    A,
    /// The side that deploys along the top rows.
    B,
}

impl Faction {
    /// Both factions in scheduling order.
    pub const ALL: [Faction; 2] = [Faction::A, Faction::B];

    /// Returns the opposing faction.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Human readable banner name of the faction.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::A => "Crown",
            Self::B => "Horde",
        }
    }

    /// Rows (inclusive start, exclusive end) the faction may deploy into.
    #[must_use]
    pub const fn deployment_rows(self, board_size: u32) -> (u32, u32) {
        let depth = if DEPLOYMENT_ROWS < board_size {
            DEPLOYMENT_ROWS
        } else {
            board_size
        };
        match self {
            Self::A => (board_size - depth, board_size),
            Self::B => (0, depth),
        }
    }
}

/// Unique identifier assigned to a deployed unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single battlefield tile expressed as row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new tile coordinate. Row zero is the top edge of the board.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two tiles.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Computes the Chebyshev distance, counting a diagonal as a single tile.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.row
            .abs_diff(other.row)
            .max(self.column.abs_diff(other.column))
    }

    /// Returns the tile displaced by the provided deltas, if it stays on a board of `size`.
    #[must_use]
    pub fn offset(self, row_delta: i32, column_delta: i32, size: u32) -> Option<CellCoord> {
        let row = i64::from(self.row) + i64::from(row_delta);
        let column = i64::from(self.column) + i64::from(column_delta);
        let bound = i64::from(size);
        if row < 0 || column < 0 || row >= bound || column >= bound {
            return None;
        }
        Some(CellCoord::new(row as u32, column as u32))
    }
}

/// Terrain covering a battlefield tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open grassland, the seed terrain of every generated map.
    #[default]
    Plain,
    /// Woodland.
    Forest,
    /// Sand dunes.
    Sand,
    /// Open water; impassable unless the unit flies or is water-adaptive.
    Water,
    /// Rocky highland.
    Mountain,
    /// Marshland.
    Swamp,
}

impl Terrain {
    /// Terrain kinds that generated blobs may take.
    pub const BLOB_KINDS: [Terrain; 5] = [
        Terrain::Forest,
        Terrain::Sand,
        Terrain::Water,
        Terrain::Mountain,
        Terrain::Swamp,
    ];

    /// Single character used when drawing the board as text.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Plain => '.',
            Self::Forest => 'f',
            Self::Sand => 's',
            Self::Water => '~',
            Self::Mountain => '^',
            Self::Swamp => ',',
        }
    }
}

/// Outcome reported once a battle reaches its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    /// Faction B was eliminated while faction A still stands.
    AWin,
    /// Faction A was eliminated while faction B still stands.
    BWin,
    /// Both factions were eliminated after the first turn began.
    Draw,
    /// The turn limit elapsed with both factions still standing.
    Stalemate,
}

impl BattleOutcome {
    /// Faction credited with the win, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Faction> {
        match self {
            Self::AWin => Some(Faction::A),
            Self::BWin => Some(Faction::B),
            Self::Draw | Self::Stalemate => None,
        }
    }
}

/// Lifecycle stage of a battle as tracked by the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Units may still be placed.
    #[default]
    Deploying,
    /// Deployment closed and turns are being resolved.
    InProgress,
    /// The battle reached a terminal outcome.
    Over(BattleOutcome),
}

impl BattlePhase {
    /// Outcome of the battle once it is over.
    #[must_use]
    pub const fn outcome(self) -> Option<BattleOutcome> {
        match self {
            Self::Over(outcome) => Some(outcome),
            Self::Deploying | Self::InProgress => None,
        }
    }
}

/// Reasons a unit placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested tile lies outside the battlefield.
    #[error("tile lies outside the battlefield")]
    OutOfBounds,
    /// Another unit already stands on the requested tile.
    #[error("tile is already occupied")]
    Occupied,
    /// The tile is water and the unit can neither fly nor swim.
    #[error("unit cannot stand on water")]
    Impassable,
    /// Deployment closed once the battle started.
    #[error("battle already in progress")]
    BattleInProgress,
    /// The requested archetype identifier does not name a catalog entry.
    #[error("unknown unit archetype")]
    UnknownArchetype,
}

/// Veteran unit carried between campaign battles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Veteran {
    /// Archetype the veteran was recruited as.
    pub kind: UnitKind,
    /// Hit points the veteran kept at the end of its last battle.
    pub current_hp: i32,
    /// Maximum hit points including hero bonuses.
    pub max_hp: i32,
    /// Attack including hero bonuses.
    pub attack: i32,
    /// Whether the veteran was promoted to hero.
    pub is_hero: bool,
    /// Hero name, present once promoted.
    pub hero_name: Option<String>,
    /// Combat record accumulated so far.
    pub record: CombatRecord,
}

/// Per-unit combat statistics accumulated during battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatRecord {
    /// Units this unit finished off.
    pub kills: u32,
    /// Damage this unit inflicted, splash included.
    pub total_damage_dealt: u32,
    /// Damage this unit received.
    pub damage_taken: u32,
    /// Turns this unit has started alive.
    pub turns_survived: u32,
    /// Whether the unit has been damaged at least once.
    pub has_taken_damage: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Replaces the battlefield with a square grid of the provided terrain.
    ConfigureBattlefield {
        /// Edge length of the square grid.
        size: u32,
        /// Row-major terrain for every tile; missing entries default to plain.
        terrain: Vec<Terrain>,
    },
    /// Deploys a fresh unit of the provided archetype.
    PlaceUnit {
        /// Archetype to instantiate.
        kind: UnitKind,
        /// Side the unit fights for.
        faction: Faction,
        /// Tile the unit starts on.
        cell: CellCoord,
    },
    /// Redeploys a campaign veteran with its preserved state.
    ReinstateVeteran {
        /// Veteran to redeploy; always fights for faction A.
        veteran: Veteran,
        /// Tile the veteran starts on.
        cell: CellCoord,
    },
    /// Closes deployment and marks the battle as started.
    StartBattle,
    /// Opens a new turn with the provided action order.
    BeginTurn {
        /// Unit identifiers in the order they will act.
        order: Vec<UnitId>,
    },
    /// Walks a unit along a sequence of adjacent tiles.
    ///
    /// A unit that ends its walk on water without being water-adaptive is
    /// slowed and loses its next action.
    MoveUnit {
        /// Unit that moves.
        unit: UnitId,
        /// Tiles to enter, in order, excluding the starting tile.
        path: Vec<CellCoord>,
    },
    /// Inflicts damage on a unit.
    DealDamage {
        /// Unit credited with the damage, if any.
        source: Option<UnitId>,
        /// Unit receiving the damage.
        target: UnitId,
        /// Hit points to remove before shields are considered.
        amount: i32,
        /// Whether the hit was a critical strike.
        critical: bool,
    },
    /// Restores hit points, capped at the unit's maximum.
    Heal {
        /// Unit credited with the heal, if any.
        source: Option<UnitId>,
        /// Unit receiving the heal.
        target: UnitId,
        /// Hit points to restore.
        amount: i32,
    },
    /// Stuns a unit so it loses its next action.
    Stun {
        /// Unit that loses its next action.
        target: UnitId,
        /// Unit responsible for the stun, if any.
        by: Option<UnitId>,
    },
    /// Spends a unit's action on a pending stun or slow and clears it.
    SkipTurn {
        /// Unit whose action is skipped.
        unit: UnitId,
    },
    /// Raises a shield that absorbs the next incoming hit.
    RaiseShield {
        /// Unit that raises the shield.
        unit: UnitId,
    },
    /// Promotes a unit to hero status.
    PromoteHero {
        /// Unit to promote.
        unit: UnitId,
        /// Name the hero will carry.
        hero_name: String,
    },
    /// Closes the current turn and removes fallen units from the roster.
    EndTurn,
    /// Records the final outcome of the battle.
    DeclareOutcome {
        /// Outcome to record.
        outcome: BattleOutcome,
    },
}

/// Events broadcast by the world and systems; together they form the battle log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a battlefield was configured.
    BattlefieldConfigured {
        /// Edge length of the square grid.
        size: u32,
    },
    /// Confirms that a unit was deployed.
    UnitPlaced {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Archetype of the unit.
        kind: UnitKind,
        /// Side the unit fights for.
        faction: Faction,
        /// Tile the unit occupies.
        cell: CellCoord,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Archetype requested for placement.
        kind: UnitKind,
        /// Tile provided in the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that deployment closed and the battle began.
    BattleStarted {
        /// Living units of faction A.
        faction_a: u32,
        /// Living units of faction B.
        faction_b: u32,
    },
    /// Announces the start of a turn.
    TurnStarted {
        /// One-based turn number.
        turn: u32,
        /// Action order for the turn.
        order: Vec<UnitId>,
    },
    /// Confirms that a unit moved.
    UnitMoved {
        /// Unit that moved.
        unit: UnitId,
        /// Tile the unit left.
        from: CellCoord,
        /// Tile the unit arrived at.
        to: CellCoord,
        /// Number of steps taken.
        steps: u32,
    },
    /// Reports that a unit could not advance toward its target.
    HeldPosition {
        /// Unit that held.
        unit: UnitId,
    },
    /// Reports that a unit found no living enemy.
    NoTarget {
        /// Unit that found nothing to fight.
        unit: UnitId,
    },
    /// Announces a single-target strike before its damage lands.
    AttackDeclared {
        /// Striking unit.
        attacker: UnitId,
        /// Unit being struck.
        target: UnitId,
        /// Projectile to animate, if any.
        projectile: ProjectileKind,
    },
    /// Announces a splash strike covering the 3x3 block around `center`.
    AreaAttack {
        /// Casting unit.
        attacker: UnitId,
        /// Tile at the centre of the blast.
        center: CellCoord,
        /// Every living unit caught in the blast.
        affected: Vec<UnitId>,
    },
    /// Announces that a unit's special move triggered.
    SpecialMoveUsed {
        /// Unit performing the move.
        unit: UnitId,
        /// Effect that triggered.
        effect: EffectKind,
        /// Unit the move was aimed at, if any.
        target: Option<UnitId>,
    },
    /// Confirms that a unit lost hit points.
    UnitDamaged {
        /// Unit that was hit.
        unit: UnitId,
        /// Unit credited with the damage, if any.
        source: Option<UnitId>,
        /// Hit points removed.
        amount: u32,
        /// Whether the hit was a critical strike.
        critical: bool,
        /// Hit points left after the hit, never negative.
        remaining_hp: i32,
    },
    /// Reports that a shield swallowed an incoming hit.
    DamageAbsorbed {
        /// Shielded unit.
        unit: UnitId,
        /// Damage that would have been dealt.
        prevented: u32,
    },
    /// Confirms that a unit fell.
    UnitDied {
        /// Unit that fell.
        unit: UnitId,
        /// Unit credited with the kill, if any.
        killer: Option<UnitId>,
    },
    /// Reports that a unit was stunned.
    UnitStunned {
        /// Stunned unit.
        unit: UnitId,
        /// Unit that stunned it, if any.
        by: Option<UnitId>,
    },
    /// Reports that a unit was slowed by water.
    UnitSlowed {
        /// Slowed unit.
        unit: UnitId,
    },
    /// Reports that a unit lost this action to a stun or slow.
    TurnSkipped {
        /// Unit that skipped.
        unit: UnitId,
    },
    /// Confirms that a unit regained hit points.
    UnitHealed {
        /// Unit that was healed.
        unit: UnitId,
        /// Unit credited with the heal, if any.
        source: Option<UnitId>,
        /// Hit points restored.
        amount: u32,
        /// Hit points after the heal.
        hp: i32,
    },
    /// Confirms that a unit raised a shield.
    ShieldRaised {
        /// Shielded unit.
        unit: UnitId,
    },
    /// Announces that a unit rose to hero status.
    HeroPromoted {
        /// Promoted unit.
        unit: UnitId,
        /// Name the hero carries.
        hero_name: String,
    },
    /// Announces the end of a turn.
    TurnEnded {
        /// Turn that ended.
        turn: u32,
        /// Fallen units removed from the roster.
        removed: Vec<UnitId>,
    },
    /// Announces the final outcome.
    BattleEnded {
        /// Outcome of the battle.
        outcome: BattleOutcome,
    },
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Archetype the unit was deployed as.
    pub kind: UnitKind,
    /// Side the unit fights for.
    pub faction: Faction,
    /// Tile currently occupied by the unit.
    pub cell: CellCoord,
    /// Current hit points, never negative.
    pub hp: i32,
    /// Maximum hit points including hero bonuses.
    pub max_hp: i32,
    /// Attack including hero bonuses.
    pub attack: i32,
    /// Defense of the archetype.
    pub defense: i32,
    /// Whether the unit was promoted to hero.
    pub is_hero: bool,
    /// Hero name, present once promoted.
    pub hero_name: Option<String>,
    /// Accumulated combat statistics.
    pub record: CombatRecord,
    /// Whether the unit will lose its next action.
    pub skip_next_turn: bool,
    /// Whether a shield will absorb the next hit.
    pub shielded: bool,
}

impl UnitSnapshot {
    /// Static archetype data backing the unit.
    #[must_use]
    pub fn archetype(&self) -> &'static UnitArchetype {
        self.kind.archetype()
    }

    /// Reports whether the unit is still standing.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Name used when narrating the unit: the hero name once promoted.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match (&self.hero_name, self.is_hero) {
            (Some(name), true) => name,
            _ => self.archetype().name,
        }
    }

    /// Hit points still missing from the maximum.
    #[must_use]
    pub fn missing_hp(&self) -> i32 {
        (self.max_hp - self.hp).max(0)
    }

    /// Distance to `cell` measured with this unit's range metric.
    #[must_use]
    pub fn range_distance(&self, cell: CellCoord) -> u32 {
        self.archetype().range_distance(self.cell, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::{BattleOutcome, CellCoord, Event, Faction, PlacementError, UnitId, UnitKind};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn chebyshev_distance_counts_diagonals_once() {
        let origin = CellCoord::new(1, 1);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(4, 3)), 3);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(2, 2)), 1);
    }

    #[test]
    fn offset_stays_on_board() {
        let corner = CellCoord::new(0, 15);
        assert_eq!(corner.offset(-1, 0, 16), None);
        assert_eq!(corner.offset(0, 1, 16), None);
        assert_eq!(corner.offset(1, -1, 16), Some(CellCoord::new(1, 14)));
    }

    #[test]
    fn deployment_rows_sit_on_opposite_edges() {
        assert_eq!(Faction::A.deployment_rows(16), (12, 16));
        assert_eq!(Faction::B.deployment_rows(16), (0, 4));
        assert_eq!(Faction::A.deployment_rows(3), (0, 3));
    }

    #[test]
    fn outcome_reports_winner() {
        assert_eq!(BattleOutcome::AWin.winner(), Some(Faction::A));
        assert_eq!(BattleOutcome::BWin.winner(), Some(Faction::B));
        assert_eq!(BattleOutcome::Draw.winner(), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn battle_log_events_round_trip_through_bincode() {
        assert_round_trip(&Event::UnitPlaced {
            unit: UnitId::new(3),
            kind: UnitKind::Wizard,
            faction: Faction::A,
            cell: CellCoord::new(13, 4),
        });
        assert_round_trip(&Event::TurnStarted {
            turn: 2,
            order: vec![UnitId::new(1), UnitId::new(0)],
        });
    }
}
