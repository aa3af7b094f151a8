//! Campaign carry-over between levels.

use skirmish_core::{BattleOutcome, CellCoord, Event, Faction, UnitId, UnitSnapshot, Veteran};
use skirmish_world::{query, World};
use tracing::{info, warn};

use crate::{Deployment, DeploymentMode, DEFAULT_BUDGET};

/// Extra opponent points granted per campaign level past the first.
const LEVEL_BUDGET_STEP: u32 = 250;

/// Points the generated opponent spends at campaign `level`.
#[must_use]
pub fn campaign_budget(level: u32) -> u32 {
    DEFAULT_BUDGET.saturating_add(LEVEL_BUDGET_STEP.saturating_mul(level.saturating_sub(1)))
}

/// Redeploys `veterans` on the first free tiles of faction A's rows, front
/// row first, and returns the new identifiers in veteran order.
///
/// Veterans are free of charge. Those left without a tile stay in reserve.
pub fn muster_veterans(
    world: &mut World,
    veterans: &[Veteran],
    out_events: &mut Vec<Event>,
) -> Vec<UnitId> {
    let size = query::battlefield(world).size();
    let (start, end) = Faction::A.deployment_rows(size);
    let mut cells =
        (start..end).flat_map(|row| (0..size).map(move |column| CellCoord::new(row, column)));
    let mut ledger = Deployment::new(Faction::A, 0);
    let mut mustered = Vec::with_capacity(veterans.len());

    for veteran in veterans {
        let crosses_water = veteran.kind.archetype().crosses_water();
        let battlefield = query::battlefield(world);
        let Some(cell) = cells.by_ref().find(|&cell| {
            battlefield.tile_at(cell).is_ok_and(|tile| {
                tile.occupant.is_none() && (crosses_water || !battlefield.is_water(cell))
            })
        }) else {
            warn!(remaining = veterans.len() - mustered.len(), "no room left for veterans");
            break;
        };
        match ledger.reinstate(world, veteran.clone(), cell, out_events) {
            Ok(unit) => mustered.push(unit),
            Err(error) => warn!(%error, ?cell, "veteran could not rejoin"),
        }
    }
    mustered
}

/// Progress of a campaign across battles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignProgress {
    level: u32,
    veterans: Vec<Veteran>,
    total_heroes: u32,
    player_points: u32,
}

impl Default for CampaignProgress {
    fn default() -> Self {
        Self {
            level: 1,
            veterans: Vec::new(),
            total_heroes: 0,
            player_points: DEFAULT_BUDGET,
        }
    }
}

impl CampaignProgress {
    /// Starts a fresh campaign at level one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level, starting at one.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Survivors carried into the next battle.
    #[must_use]
    pub fn veterans(&self) -> &[Veteran] {
        &self.veterans
    }

    /// Heroes promoted over the whole campaign.
    #[must_use]
    pub fn total_heroes(&self) -> u32 {
        self.total_heroes
    }

    /// Points the player may spend on fresh recruits each level.
    #[must_use]
    pub fn player_points(&self) -> u32 {
        self.player_points
    }

    /// Deployment mode for the next battle.
    #[must_use]
    pub fn mode(&self) -> DeploymentMode {
        DeploymentMode::Campaign {
            level: self.level,
            veterans: self.veterans.clone(),
        }
    }

    /// Folds the finished battle into the campaign.
    ///
    /// A win by faction A keeps its survivors as veterans and advances a
    /// level. Any other outcome restarts the campaign.
    pub fn record_outcome(&mut self, world: &World, outcome: BattleOutcome) {
        if outcome != BattleOutcome::AWin {
            info!(?outcome, level = self.level, "campaign lost, starting over");
            *self = Self::default();
            return;
        }

        let carried_heroes = self.veterans.iter().filter(|veteran| veteran.is_hero).count();
        let mut crown = query::units(world);
        crown.extend(query::fallen_units(world));
        let heroes = crown
            .iter()
            .filter(|unit| unit.faction == Faction::A && unit.is_hero)
            .count();
        let promoted = heroes.saturating_sub(carried_heroes);

        self.veterans = query::living_units(world)
            .iter()
            .filter(|unit| unit.faction == Faction::A)
            .map(enlist_veteran)
            .collect();
        self.total_heroes += u32::try_from(promoted).unwrap_or(u32::MAX);
        self.level += 1;
        info!(
            level = self.level,
            veterans = self.veterans.len(),
            heroes = self.total_heroes,
            "campaign advanced"
        );
    }
}

fn enlist_veteran(unit: &UnitSnapshot) -> Veteran {
    Veteran {
        kind: unit.kind,
        current_hp: unit.hp,
        max_hp: unit.max_hp,
        attack: unit.attack,
        is_hero: unit.is_hero,
        hero_name: unit.hero_name.clone(),
        record: unit.record,
    }
}

#[cfg(test)]
mod tests {
    use super::{campaign_budget, muster_veterans, CampaignProgress};
    use skirmish_core::{BattleOutcome, CellCoord, Command, Faction, UnitKind};
    use skirmish_world::{self as world, query, World};

    #[test]
    fn opponent_budget_grows_per_level() {
        assert_eq!(campaign_budget(1), 1000);
        assert_eq!(campaign_budget(2), 1250);
        assert_eq!(campaign_budget(5), 2000);
        assert_eq!(campaign_budget(0), 1000);
    }

    #[test]
    fn victory_carries_wounded_heroes_forward() {
        let mut world = World::new();
        let mut events = Vec::new();
        let archer = world::place_unit(
            &mut world,
            UnitKind::Archer,
            Faction::A,
            CellCoord::new(13, 1),
            &mut events,
        )
        .expect("archer placed");
        let militia = world::place_unit(
            &mut world,
            UnitKind::Militia,
            Faction::A,
            CellCoord::new(13, 2),
            &mut events,
        )
        .expect("militia placed");
        world::apply(&mut world, Command::StartBattle, &mut events);
        for command in [
            Command::DealDamage {
                source: None,
                target: archer,
                amount: 10,
                critical: false,
            },
            Command::PromoteHero {
                unit: archer,
                hero_name: "Lira the Swift".to_owned(),
            },
            Command::DealDamage {
                source: None,
                target: militia,
                amount: 50,
                critical: false,
            },
        ] {
            world::apply(&mut world, command, &mut events);
        }

        let mut campaign = CampaignProgress::new();
        campaign.record_outcome(&world, BattleOutcome::AWin);

        assert_eq!(campaign.level(), 2);
        assert_eq!(campaign.total_heroes(), 1);
        let [veteran] = campaign.veterans() else {
            panic!("exactly one survivor expected");
        };
        assert_eq!(veteran.kind, UnitKind::Archer);
        assert_eq!(veteran.current_hp, 20);
        assert_eq!(veteran.max_hp, 30);
        assert_eq!(veteran.hero_name.as_deref(), Some("Lira the Swift"));
    }

    #[test]
    fn veterans_muster_on_the_front_row() {
        let mut world = World::new();
        let mut events = Vec::new();
        let _ = world::place_unit(
            &mut world,
            UnitKind::Knight,
            Faction::A,
            CellCoord::new(12, 0),
            &mut events,
        )
        .expect("knight placed");
        let _ = world::place_unit(
            &mut world,
            UnitKind::Archer,
            Faction::A,
            CellCoord::new(13, 0),
            &mut events,
        )
        .expect("archer placed");
        let mut campaign = CampaignProgress::new();
        campaign.record_outcome(&world, BattleOutcome::AWin);

        let mut next = World::new();
        let mustered = muster_veterans(&mut next, campaign.veterans(), &mut events);
        assert_eq!(mustered.len(), 2);
        let cells: Vec<CellCoord> = query::units(&next).iter().map(|unit| unit.cell).collect();
        assert_eq!(cells, vec![CellCoord::new(12, 0), CellCoord::new(12, 1)]);
    }

    #[test]
    fn defeat_or_draw_restarts_the_campaign() {
        let mut world = World::new();
        let mut events = Vec::new();
        let _ = world::place_unit(
            &mut world,
            UnitKind::Knight,
            Faction::A,
            CellCoord::new(12, 0),
            &mut events,
        )
        .expect("knight placed");
        let mut campaign = CampaignProgress::new();
        campaign.record_outcome(&world, BattleOutcome::AWin);
        assert_eq!(campaign.level(), 2);

        campaign.record_outcome(&world, BattleOutcome::Draw);
        assert_eq!(campaign, CampaignProgress::default());
        assert_eq!(campaign.player_points(), 1000);
    }
}
