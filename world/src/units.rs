//! Mutable unit instances owned by the world roster.

use skirmish_core::{CellCoord, CombatRecord, Faction, UnitId, UnitKind, UnitSnapshot, Veteran};

#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) kind: UnitKind,
    pub(crate) faction: Faction,
    pub(crate) cell: CellCoord,
    pub(crate) hp: i32,
    pub(crate) max_hp: i32,
    pub(crate) attack: i32,
    pub(crate) is_hero: bool,
    pub(crate) hero_name: Option<String>,
    pub(crate) record: CombatRecord,
    pub(crate) skip_next_turn: bool,
    pub(crate) shielded: bool,
}

impl Unit {
    pub(crate) fn recruit(id: UnitId, kind: UnitKind, faction: Faction, cell: CellCoord) -> Self {
        let archetype = kind.archetype();
        Self {
            id,
            kind,
            faction,
            cell,
            hp: archetype.max_hp,
            max_hp: archetype.max_hp,
            attack: archetype.attack,
            is_hero: false,
            hero_name: None,
            record: CombatRecord::default(),
            skip_next_turn: false,
            shielded: false,
        }
    }

    pub(crate) fn reinstate(id: UnitId, veteran: Veteran, cell: CellCoord) -> Self {
        let max_hp = veteran.max_hp.max(1);
        Self {
            id,
            kind: veteran.kind,
            faction: Faction::A,
            cell,
            hp: veteran.current_hp.clamp(1, max_hp),
            max_hp,
            attack: veteran.attack,
            is_hero: veteran.is_hero,
            hero_name: veteran.hero_name,
            record: veteran.record,
            skip_next_turn: false,
            shielded: false,
        }
    }

    pub(crate) const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            kind: self.kind,
            faction: self.faction,
            cell: self.cell,
            hp: self.hp.max(0),
            max_hp: self.max_hp,
            attack: self.attack,
            defense: self.kind.archetype().defense,
            is_hero: self.is_hero,
            hero_name: self.hero_name.clone(),
            record: self.record,
            skip_next_turn: self.skip_next_turn,
            shielded: self.shielded,
        }
    }
}

/// Running totals reported in the end-of-battle summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BattleTallies {
    /// Units placed on the battlefield.
    pub deployed: u32,
    /// Units that fell.
    pub lost: u32,
    /// Damage dealt by every hit combined.
    pub total_damage: u32,
    /// Largest single hit.
    pub highest_hit: u32,
    /// Critical strikes landed.
    pub critical_hits: u32,
}
