#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Army deployment: budgeted random armies, validated player placement and
//! campaign carry-over between battles.

mod campaign;

use std::collections::BTreeSet;

use skirmish_core::{
    archetype, cheapest_cost, faction_roster, CellCoord, Command, Dice, Event, Faction,
    PlacementError, Terrain, UnitId, Veteran,
};
use skirmish_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, info};

pub use campaign::{campaign_budget, muster_veterans, CampaignProgress};

/// Points each army may spend unless configured otherwise.
pub const DEFAULT_BUDGET: u32 = 1000;

/// Budget and retry limits for deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// Points available to an army.
    pub budget: u32,
    /// Random picks the generator may make before giving up.
    pub attempts: u32,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            attempts: 1000,
        }
    }
}

/// How the two armies are assembled before a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    /// The player deploys faction A; faction B is generated from a budget.
    Single {
        /// Points the generated opponent may spend.
        opponent_budget: u32,
    },
    /// Both armies are deployed by the host, each from its own budget.
    TwoPlayer,
    /// Faction A carries veterans from earlier levels; faction B is generated.
    Campaign {
        /// Campaign level, starting at one.
        level: u32,
        /// Survivors of the previous level.
        veterans: Vec<Veteran>,
    },
}

impl Default for DeploymentMode {
    fn default() -> Self {
        Self::Single {
            opponent_budget: DEFAULT_BUDGET,
        }
    }
}

impl DeploymentMode {
    /// Budget the generated opponent spends, or `None` when the host deploys both sides.
    #[must_use]
    pub fn opponent_budget(&self) -> Option<u32> {
        match self {
            Self::Single { opponent_budget } => Some(*opponent_budget),
            Self::TwoPlayer => None,
            Self::Campaign { level, .. } => Some(campaign_budget(*level)),
        }
    }

    /// Veterans to redeploy for faction A.
    #[must_use]
    pub fn veterans(&self) -> &[Veteran] {
        match self {
            Self::Campaign { veterans, .. } => veterans,
            Self::Single { .. } | Self::TwoPlayer => &[],
        }
    }
}

/// Reasons a player placement is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DeploymentError {
    /// The archetype belongs to the other army.
    #[error("{kind} cannot be recruited by the {faction:?} army")]
    WrongFaction {
        /// Requested archetype identifier.
        kind: &'static str,
        /// Army that tried to recruit it.
        faction: Faction,
    },
    /// The tile lies outside the army's deployment rows.
    #[error("tile ({}, {}) is outside the deployment zone", .cell.row(), .cell.column())]
    OutsideDeploymentZone {
        /// Requested tile.
        cell: CellCoord,
    },
    /// The archetype costs more than the points left.
    #[error("unit costs {cost} points but only {remaining} remain")]
    OverBudget {
        /// Cost of the archetype.
        cost: u32,
        /// Points left in the budget.
        remaining: u32,
    },
    /// The world refused the placement.
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Player-facing deployment ledger for one army.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    faction: Faction,
    remaining: u32,
}

impl Deployment {
    /// Opens a ledger for `faction` with `budget` points.
    #[must_use]
    pub fn new(faction: Faction, budget: u32) -> Self {
        Self {
            faction,
            remaining: budget,
        }
    }

    /// Army the ledger deploys.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Points still available.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Reports whether any archetype is still affordable.
    #[must_use]
    pub fn can_afford_any(&self) -> bool {
        self.remaining >= cheapest_cost(self.faction)
    }

    /// Places the archetype named `archetype_id` at `cell` and charges its cost.
    ///
    /// The tile must lie in the army's deployment rows, the archetype must
    /// belong to the army and fit the remaining budget, and the world must
    /// accept the tile. Nothing is charged when the placement is refused.
    pub fn place_for_player(
        &mut self,
        world: &mut World,
        archetype_id: &str,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<UnitId, DeploymentError> {
        let recruit = archetype(archetype_id).ok_or(PlacementError::UnknownArchetype)?;
        if recruit.faction != self.faction {
            return Err(DeploymentError::WrongFaction {
                kind: recruit.id,
                faction: self.faction,
            });
        }
        self.check_zone(world, cell)?;
        if recruit.cost > self.remaining {
            return Err(DeploymentError::OverBudget {
                cost: recruit.cost,
                remaining: self.remaining,
            });
        }
        let unit = world::place_unit(world, recruit.kind, self.faction, cell, out_events)?;
        self.remaining -= recruit.cost;
        debug!(unit = unit.get(), kind = recruit.id, remaining = self.remaining, "unit deployed");
        Ok(unit)
    }

    /// Redeploys a campaign veteran at `cell` without charging the budget.
    pub fn reinstate(
        &mut self,
        world: &mut World,
        veteran: Veteran,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<UnitId, DeploymentError> {
        self.check_zone(world, cell)?;
        Ok(world::reinstate_veteran(world, veteran, cell, out_events)?)
    }

    fn check_zone(&self, world: &World, cell: CellCoord) -> Result<(), DeploymentError> {
        let (start, end) = self
            .faction
            .deployment_rows(query::battlefield(world).size());
        if (start..end).contains(&cell.row()) {
            Ok(())
        } else {
            Err(DeploymentError::OutsideDeploymentZone { cell })
        }
    }
}

/// Random army generator spending a point budget inside an army's deployment rows.
#[derive(Clone, Debug, Default)]
pub struct BudgetGenerator {
    config: DeploymentConfig,
}

impl BudgetGenerator {
    /// Creates a generator with the provided limits.
    #[must_use]
    pub fn new(config: DeploymentConfig) -> Self {
        Self { config }
    }

    /// Emits placement commands for a random army worth at most `budget` points.
    ///
    /// Every pick consumes an attempt: an archetype is drawn first and skipped
    /// when unaffordable, then a tile in the deployment rows is drawn and
    /// skipped when it is already taken or is water the archetype cannot
    /// stand on. Generation stops once the cheapest archetype no longer fits
    /// or the attempts run out. Returns the points spent.
    pub fn handle<D>(
        &self,
        world: &World,
        faction: Faction,
        budget: u32,
        dice: &mut D,
        out: &mut Vec<Command>,
    ) -> u32
    where
        D: Dice + ?Sized,
    {
        let roster = faction_roster(faction);
        let cheapest = cheapest_cost(faction);
        let battlefield = query::battlefield(world);
        let (start, end) = faction.deployment_rows(battlefield.size());
        let rows = usize::try_from(end - start).unwrap_or(0);
        let columns = usize::try_from(battlefield.size()).unwrap_or(0);
        if roster.is_empty() || rows == 0 || columns == 0 {
            return 0;
        }

        let mut remaining = budget;
        let mut claimed = BTreeSet::new();
        let mut placed = 0_u32;
        for _ in 0..self.config.attempts {
            if remaining < cheapest {
                break;
            }
            let recruit = &roster[dice.index(roster.len(), "deployment archetype")];
            if recruit.cost > remaining {
                continue;
            }
            let row = start + u32::try_from(dice.index(rows, "deployment row")).unwrap_or(0);
            let column = u32::try_from(dice.index(columns, "deployment column")).unwrap_or(0);
            let cell = CellCoord::new(row, column);
            if claimed.contains(&cell) {
                continue;
            }
            let free = battlefield.tile_at(cell).is_ok_and(|tile| {
                tile.occupant.is_none()
                    && (tile.terrain != Terrain::Water || recruit.crosses_water())
            });
            if !free {
                continue;
            }
            let _ = claimed.insert(cell);
            remaining -= recruit.cost;
            placed += 1;
            out.push(Command::PlaceUnit {
                kind: recruit.kind,
                faction,
                cell,
            });
        }

        let spent = budget - remaining;
        info!(?faction, placed, spent, "reinforcements generated");
        spent
    }
}
