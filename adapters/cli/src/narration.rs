//! Battle log lines rendered from engine events.

use skirmish_core::{BattleOutcome, EffectKind, Event, UnitId};
use skirmish_world::{query, World};

const ATTACK: &[&str] = &[
    "[A] strikes [D] for [DMG]!",
    "[A] hacks at [D], dealing [DMG]!",
    "[A] swings at [D] and hits for [DMG]!",
    "[A] lands a blow on [D] ([DMG] damage)!",
];
const MOVE: &[&str] = &[
    "[U] advances.",
    "[U] moves forward.",
    "[U] repositions.",
    "[U] shifts on the battlefield.",
];
const HOLD: &[&str] = &[
    "[U] holds position.",
    "[U] stands their ground.",
    "[U] waits for an opening.",
    "[U] braces for impact.",
];
const DEATH: &[&str] = &[
    "[D] falls, their shield shattered!",
    "[D] screams as they collapse!",
    "[D] drops to the ground, defeated!",
    "A silence falls as [D] is slain!",
];
const SPELL: &[&str] = &[
    "[A] unleashes a torrent of magic!",
    "[A] casts a devastating spell!",
    "Arcane fire erupts from [A]!",
    "[A] conjures a blast of energy!",
];
const CRIT: &[&str] = &[
    "[A] lands a CRITICAL HIT on [D] for [DMG]!",
    "[A] delivers a devastating blow to [D] ([DMG] CRIT)!",
];

/// Renders engine events as battle log lines.
pub(crate) trait Narrate {
    /// Log line for the event, or `None` when it is not worth a line.
    fn narrate(&self, world: &World) -> Option<String>;
}

impl Narrate for Event {
    fn narrate(&self, world: &World) -> Option<String> {
        let turn = query::turn_number(world);
        let name = |unit: UnitId| {
            query::any_unit(world, unit).map_or_else(
                || format!("unit #{}", unit.get()),
                |snapshot| snapshot.display_name().to_owned(),
            )
        };

        let line = match self {
            Self::BattleStarted {
                faction_a,
                faction_b,
            } => format!("Battle Begins! {faction_a} Crown units face {faction_b} Horde units."),
            Self::PlacementRejected { kind, cell, reason } => format!(
                "{} cannot deploy at ({}, {}): {reason}.",
                kind.archetype().name,
                cell.row(),
                cell.column()
            ),
            Self::TurnStarted { turn, .. } => format!("--- Turn {turn} ---"),
            Self::UnitMoved { unit, .. } => fill(pick(MOVE, *unit, turn), &name(*unit), "", 0),
            Self::HeldPosition { unit } => fill(pick(HOLD, *unit, turn), &name(*unit), "", 0),
            Self::NoTarget { unit } => format!("{} finds no enemies.", name(*unit)),
            Self::AreaAttack { attacker, .. } => {
                fill(pick(SPELL, *attacker, turn), &name(*attacker), "", 0)
            }
            Self::SpecialMoveUsed { unit, effect, .. } => special_line(world, *unit, *effect)?,
            Self::UnitDamaged {
                unit,
                source: Some(source),
                amount,
                critical,
                ..
            } => {
                let templates = if *critical { CRIT } else { ATTACK };
                fill(pick(templates, *source, turn), &name(*source), &name(*unit), *amount)
            }
            Self::UnitDamaged {
                unit,
                source: None,
                amount,
                ..
            } => format!("{} takes {amount} damage.", name(*unit)),
            Self::DamageAbsorbed { unit, prevented } => {
                format!("{}'s shield absorbs {prevented} damage!", name(*unit))
            }
            Self::UnitDied { unit, .. } => fill(pick(DEATH, *unit, turn), "", &name(*unit), 0),
            Self::UnitStunned { unit, .. } => format!("{} is stunned!", name(*unit)),
            Self::UnitSlowed { unit } => format!("{} is slowed by the water.", name(*unit)),
            Self::TurnSkipped { unit } => format!("{} loses the turn.", name(*unit)),
            Self::UnitHealed { unit, amount, .. } => {
                format!("{} is healed for {amount}.", name(*unit))
            }
            Self::ShieldRaised { unit } => format!("{} raises a shield.", name(*unit)),
            Self::HeroPromoted { hero_name, .. } => {
                format!("{hero_name} rises as a hero of the battle!")
            }
            Self::BattleEnded { outcome } => outcome_line(*outcome).to_owned(),
            Self::BattlefieldConfigured { .. }
            | Self::UnitPlaced { .. }
            | Self::AttackDeclared { .. }
            | Self::TurnEnded { .. } => return None,
        };
        Some(line)
    }
}

fn special_line(world: &World, unit: UnitId, effect: EffectKind) -> Option<String> {
    let snapshot = query::any_unit(world, unit)?;
    let move_name = snapshot.archetype().special.map_or("a special move", |special| special.name);
    let flourish = match effect {
        EffectKind::LastStand => " Double damage!",
        EffectKind::QuickShot => " Attacks twice!",
        EffectKind::PiercingBolt => " The bolt ignores armor!",
        EffectKind::Charge => " Thundering in!",
        EffectKind::Lifesteal => " Drinking deep!",
        _ => "",
    };
    Some(format!("{} uses {move_name}!{flourish}", snapshot.display_name()))
}

fn outcome_line(outcome: BattleOutcome) -> &'static str {
    match outcome {
        BattleOutcome::AWin => "Victory! The Crown holds the field.",
        BattleOutcome::BWin => "Defeat! The Horde overruns the field.",
        BattleOutcome::Draw => "Both armies lie broken. The battle is a draw.",
        BattleOutcome::Stalemate => "Neither side can break through. Stalemate.",
    }
}

/// Rotates through template variants by unit and turn.
fn pick(templates: &'static [&'static str], unit: UnitId, turn: u32) -> &'static str {
    let slot = (unit.get() as usize).wrapping_add(turn as usize) % templates.len();
    templates[slot]
}

fn fill(template: &str, actor: &str, target: &str, damage: u32) -> String {
    template
        .replace("[A]", actor)
        .replace("[U]", actor)
        .replace("[D]", target)
        .replace("[DMG]", &damage.to_string())
}
