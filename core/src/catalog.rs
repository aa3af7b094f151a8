//! Static unit archetypes for both factions.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Faction};

/// Identifies one archetype in the unit catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Cheap Crown infantry.
    Militia,
    /// Crown bowman.
    Archer,
    /// Armoured Crown melee unit.
    Knight,
    /// Flying Crown caster with splash damage.
    Wizard,
    /// Heavy Crown melee unit.
    Paladin,
    /// Crown marksman.
    Crossbowman,
    /// Crown healer.
    Cleric,
    /// Fast Crown skirmisher.
    Scout,
    /// Crown mounted lancer.
    Cavalry,
    /// Horde infantry.
    Orc,
    /// Fast, fragile Horde raider.
    Goblin,
    /// Water-adaptive Horde brute.
    Troll,
    /// Horde spellcaster.
    Shaman,
    /// Horde heavy hitter.
    Berserker,
    /// Fast Horde rider.
    Wolfrider,
    /// Heavy Horde bruiser.
    Ogre,
    /// Flying Horde trickster.
    Imp,
    /// Horde blood mage.
    Bloodboy,
}

impl UnitKind {
    /// Every archetype in catalog order.
    pub const ALL: [UnitKind; 18] = [
        UnitKind::Militia,
        UnitKind::Archer,
        UnitKind::Knight,
        UnitKind::Wizard,
        UnitKind::Paladin,
        UnitKind::Crossbowman,
        UnitKind::Cleric,
        UnitKind::Scout,
        UnitKind::Cavalry,
        UnitKind::Orc,
        UnitKind::Goblin,
        UnitKind::Troll,
        UnitKind::Shaman,
        UnitKind::Berserker,
        UnitKind::Wolfrider,
        UnitKind::Ogre,
        UnitKind::Imp,
        UnitKind::Bloodboy,
    ];

    /// Static data describing the archetype.
    #[must_use]
    pub fn archetype(self) -> &'static UnitArchetype {
        &CATALOG[self as usize]
    }

    /// Stable lowercase identifier used in configuration and transfer strings.
    #[must_use]
    pub fn id(self) -> &'static str {
        self.archetype().id
    }

    /// Resolves an identifier such as `"knight"` into its archetype kind.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        archetype(id).map(|archetype| archetype.kind)
    }
}

/// Visual projectile a ranged strike launches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Melee strike with nothing in flight.
    #[default]
    None,
    /// Plain arrow.
    Arrow,
    /// Fireball.
    Fire,
    /// Crossbow bolt.
    Bolt,
    /// Holy light.
    Holy,
}

/// Mechanical effect a special move applies when it triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Doubles damage while the user is below ten hit points.
    LastStand,
    /// Strikes the same target twice.
    QuickShot,
    /// Stuns the target.
    ShieldBash,
    /// Fire surge.
    InfernoSurge,
    /// Absorbs the next incoming hit.
    DivineShield,
    /// Ignores the target's defense.
    PiercingBolt,
    /// Heals the most injured nearby ally instead of attacking.
    HolyMend,
    /// Dust cloud.
    BlindingDust,
    /// Rushes the target along a clear straight line.
    Charge,
    /// War cry.
    RoarOfBlood,
    /// Strike from behind.
    Backstab,
    /// Hardened skin.
    ThickHide,
    /// Magic pulse.
    SpiritBurst,
    /// Rage.
    BloodFrenzy,
    /// Pack howl.
    Howl,
    /// Stuns the target.
    QuakeSlam,
    /// Short teleport.
    TricksterBlink,
    /// Heals the user by the damage dealt.
    Lifesteal,
}

impl EffectKind {
    /// Reports whether the effect is announced but changes nothing in play.
    #[must_use]
    pub const fn is_cosmetic(self) -> bool {
        matches!(
            self,
            Self::InfernoSurge
                | Self::BlindingDust
                | Self::RoarOfBlood
                | Self::Backstab
                | Self::ThickHide
                | Self::SpiritBurst
                | Self::BloodFrenzy
                | Self::Howl
                | Self::TricksterBlink
        )
    }
}

/// Probabilistic alternate action carried by an archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpecialMove {
    /// Display name of the move.
    pub name: &'static str,
    /// Probability in `[0, 1]` that the move triggers on a given action.
    pub trigger_chance: f64,
    /// Mechanical effect of the move.
    pub effect: EffectKind,
}

/// Immutable template describing a unit type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitArchetype {
    /// Kind this entry describes.
    pub kind: UnitKind,
    /// Stable lowercase identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Single letter used on text boards.
    pub symbol: char,
    /// Faction the archetype recruits into.
    pub faction: Faction,
    /// Deployment cost in points.
    pub cost: u32,
    /// Starting and maximum hit points.
    pub max_hp: i32,
    /// Base attack.
    pub attack: i32,
    /// Base defense.
    pub defense: i32,
    /// Attack range in tiles.
    pub range: u32,
    /// Tiles moved per turn.
    pub speed: u32,
    /// Whether the unit ignores water.
    pub can_fly: bool,
    /// Whether the unit wades through water unhindered.
    pub is_water_adaptive: bool,
    /// Whether strikes splash over the 3x3 block around the target.
    pub has_area_attack: bool,
    /// Projectile launched by ranged strikes.
    pub projectile: ProjectileKind,
    /// Optional special move.
    pub special: Option<SpecialMove>,
}

impl UnitArchetype {
    /// Whether the unit may enter or stand on water tiles.
    #[must_use]
    pub const fn crosses_water(&self) -> bool {
        self.can_fly || self.is_water_adaptive
    }

    /// Special move effect, if the archetype has one.
    #[must_use]
    pub fn special_effect(&self) -> Option<EffectKind> {
        self.special.map(|special| special.effect)
    }

    /// Distance between two tiles under this archetype's range metric.
    ///
    /// Melee archetypes (range one) use Manhattan distance; ranged archetypes
    /// use Chebyshev distance so diagonals count as a single tile of range.
    #[must_use]
    pub fn range_distance(&self, from: CellCoord, to: CellCoord) -> u32 {
        if self.range > 1 {
            from.chebyshev_distance(to)
        } else {
            from.manhattan_distance(to)
        }
    }

    /// Reports whether a unit standing on `from` can strike a unit on `to`.
    #[must_use]
    pub fn reaches(&self, from: CellCoord, to: CellCoord) -> bool {
        self.range_distance(from, to) <= self.range
    }
}

const fn special(
    name: &'static str,
    trigger_chance: f64,
    effect: EffectKind,
) -> Option<SpecialMove> {
    Some(SpecialMove {
        name,
        trigger_chance,
        effect,
    })
}

const fn unit(
    kind: UnitKind,
    id: &'static str,
    name: &'static str,
    symbol: char,
    faction: Faction,
    stats: [i32; 6],
    projectile: ProjectileKind,
    special: Option<SpecialMove>,
) -> UnitArchetype {
    let [cost, max_hp, attack, defense, range, speed] = stats;
    UnitArchetype {
        kind,
        id,
        name,
        symbol,
        faction,
        cost: cost as u32,
        max_hp,
        attack,
        defense,
        range: range as u32,
        speed: speed as u32,
        can_fly: false,
        is_water_adaptive: false,
        has_area_attack: false,
        projectile,
        special,
    }
}

const fn flying(mut archetype: UnitArchetype) -> UnitArchetype {
    archetype.can_fly = true;
    archetype
}

const fn splashing(mut archetype: UnitArchetype) -> UnitArchetype {
    archetype.has_area_attack = true;
    archetype
}

const fn swimming(mut archetype: UnitArchetype) -> UnitArchetype {
    archetype.is_water_adaptive = true;
    archetype
}

use EffectKind as E;
use Faction::{A as CROWN, B as HORDE};
use ProjectileKind as P;
use UnitKind as K;

// Stats column order: cost, hp, attack, defense, range, speed.
#[rustfmt::skip]
static CATALOG: [UnitArchetype; 18] = [
    unit(K::Militia, "militia", "Militia", 'M', CROWN, [50, 20, 6, 2, 1, 1], P::None, special("Last Stand", 0.10, E::LastStand)),
    unit(K::Archer, "archer", "Archer", 'A', CROWN, [75, 25, 7, 1, 4, 1], P::Arrow, special("Quick Shot", 0.10, E::QuickShot)),
    unit(K::Knight, "knight", "Knight", 'K', CROWN, [100, 45, 7, 4, 1, 1], P::None, special("Shield Bash", 0.05, E::ShieldBash)),
    flying(splashing(unit(K::Wizard, "wizard", "Wizard", 'W', CROWN, [150, 20, 10, 1, 4, 1], P::Fire, special("Inferno Surge", 0.10, E::InfernoSurge)))),
    unit(K::Paladin, "paladin", "Paladin", 'P', CROWN, [175, 50, 8, 5, 1, 1], P::None, special("Divine Shield", 0.05, E::DivineShield)),
    unit(K::Crossbowman, "crossbowman", "Crossbowman", 'C', CROWN, [125, 30, 9, 1, 4, 1], P::Bolt, special("Piercing Bolt", 0.10, E::PiercingBolt)),
    unit(K::Cleric, "cleric", "Cleric", 'H', CROWN, [175, 25, 6, 2, 5, 1], P::Holy, special("Holy Mend", 0.15, E::HolyMend)),
    unit(K::Scout, "scout", "Scout", 'S', CROWN, [60, 18, 5, 1, 1, 4], P::None, special("Blinding Dust", 0.10, E::BlindingDust)),
    unit(K::Cavalry, "cavalry", "Cavalry", 'V', CROWN, [130, 35, 8, 3, 1, 3], P::None, special("Charge", 0.15, E::Charge)),
    unit(K::Orc, "orc", "Orc", 'O', HORDE, [60, 35, 6, 2, 1, 1], P::None, special("Roar of Blood", 0.10, E::RoarOfBlood)),
    unit(K::Goblin, "goblin", "Goblin", 'G', HORDE, [40, 15, 4, 1, 1, 3], P::None, special("Backstab", 0.10, E::Backstab)),
    swimming(unit(K::Troll, "troll", "Troll", 'T', HORDE, [100, 45, 7, 4, 2, 1], P::Arrow, special("Thick Hide", 0.05, E::ThickHide))),
    unit(K::Shaman, "shaman", "Shaman", 'S', HORDE, [140, 25, 7, 1, 3, 1], P::Arrow, special("Spirit Burst", 0.10, E::SpiritBurst)),
    unit(K::Berserker, "berserker", "Berserker", 'B', HORDE, [180, 40, 10, 2, 1, 2], P::None, special("Blood Frenzy", 0.10, E::BloodFrenzy)),
    unit(K::Wolfrider, "wolfrider", "Wolfrider", 'W', HORDE, [90, 30, 7, 2, 2, 4], P::Arrow, special("Howl", 0.15, E::Howl)),
    unit(K::Ogre, "ogre", "Ogre", 'O', HORDE, [160, 55, 8, 5, 1, 2], P::None, special("Quake Slam", 0.05, E::QuakeSlam)),
    flying(unit(K::Imp, "imp", "Imp", 'I', HORDE, [70, 15, 4, 1, 3, 1], P::Arrow, special("Trickster Blink", 0.10, E::TricksterBlink))),
    unit(K::Bloodboy, "bloodboy", "BloodBoy", 'B', HORDE, [120, 30, 8, 2, 2, 2], P::Arrow, special("Lifesteal", 0.10, E::Lifesteal)),
];

/// Looks up an archetype by its lowercase identifier.
#[must_use]
pub fn archetype(id: &str) -> Option<&'static UnitArchetype> {
    CATALOG
        .iter()
        .find(|archetype| archetype.id.eq_ignore_ascii_case(id))
}

/// Every archetype recruitable by `faction`, in catalog order.
#[must_use]
pub fn faction_roster(faction: Faction) -> &'static [UnitArchetype] {
    match faction {
        Faction::A => &CATALOG[..9],
        Faction::B => &CATALOG[9..],
    }
}

/// Cost of the cheapest archetype available to `faction`.
#[must_use]
pub fn cheapest_cost(faction: Faction) -> u32 {
    faction_roster(faction)
        .iter()
        .map(|archetype| archetype.cost)
        .min()
        .unwrap_or(0)
}
