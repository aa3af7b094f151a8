use proptest::prelude::*;
use skirmish_core::{CellCoord, Command, Event, Faction, ScriptedDice, UnitId, UnitKind};
use skirmish_system_progression::{summarize, Progression, HERO_NAMES};
use skirmish_world::{self as world, query, World};

struct Arena {
    world: World,
    crown: UnitId,
    horde: UnitId,
}

fn arena() -> Arena {
    let mut world = World::new();
    let mut events = Vec::new();
    let crown = world::place_unit(
        &mut world,
        UnitKind::Knight,
        Faction::A,
        CellCoord::new(12, 3),
        &mut events,
    )
    .expect("knight placed");
    let horde = world::place_unit(
        &mut world,
        UnitKind::Ogre,
        Faction::B,
        CellCoord::new(3, 3),
        &mut events,
    )
    .expect("ogre placed");
    world::apply(&mut world, Command::StartBattle, &mut events);
    Arena {
        world,
        crown,
        horde,
    }
}

fn hit(world: &mut World, source: UnitId, target: UnitId, amount: i32) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::DealDamage {
            source: Some(source),
            target,
            amount,
            critical: false,
        },
        &mut events,
    );
}

fn promote_pass(world: &mut World, progression: &Progression) -> Vec<Event> {
    let mut commands = Vec::new();
    progression.handle(world, &mut ScriptedDice::new([0.0], 0.0), &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn damage_threshold_promotes_with_stat_bonus() {
    let mut arena = arena();
    hit(&mut arena.world, arena.horde, arena.crown, 10);
    hit(&mut arena.world, arena.crown, arena.horde, 20);

    let events = promote_pass(&mut arena.world, &Progression::default());
    assert_eq!(
        events,
        vec![Event::HeroPromoted {
            unit: arena.crown,
            hero_name: HERO_NAMES[0].to_owned(),
        }]
    );

    let hero = query::unit(&arena.world, arena.crown).expect("knight");
    assert!(hero.is_hero);
    assert_eq!(hero.attack, 9);
    assert_eq!(hero.max_hp, 50);
    // The promotion grants five hit points on top of the wounded total.
    assert_eq!(hero.hp, 40);
}

#[test]
fn repeated_checks_promote_once() {
    let mut arena = arena();
    hit(&mut arena.world, arena.crown, arena.horde, 25);
    let progression = Progression::default();
    let first = promote_pass(&mut arena.world, &progression);
    let second = promote_pass(&mut arena.world, &progression);
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

#[test]
fn endurance_requires_having_been_hurt() {
    let mut arena = arena();
    let progression = Progression::default();
    let mut events = Vec::new();
    for _ in 0..6 {
        world::apply(
            &mut arena.world,
            Command::BeginTurn {
                order: vec![arena.crown, arena.horde],
            },
            &mut events,
        );
        world::apply(&mut arena.world, Command::EndTurn, &mut events);
    }
    assert!(promote_pass(&mut arena.world, &progression).is_empty());

    hit(&mut arena.world, arena.crown, arena.horde, 1);
    let promoted = promote_pass(&mut arena.world, &progression);
    assert_eq!(promoted.len(), 1);
    assert!(matches!(
        promoted[0],
        Event::HeroPromoted { unit, .. } if unit == arena.horde
    ));
}

#[test]
fn summary_reports_standouts_and_totals() {
    let mut arena = arena();
    hit(&mut arena.world, arena.crown, arena.horde, 30);
    hit(&mut arena.world, arena.horde, arena.crown, 12);
    hit(&mut arena.world, arena.crown, arena.horde, 30);
    let mut events = Vec::new();
    world::apply(&mut arena.world, Command::EndTurn, &mut events);

    let summary = summarize(&arena.world);
    assert_eq!(summary.total_deployed, 2);
    assert_eq!(summary.total_lost, 1);
    assert_eq!(summary.total_damage, 30 + 12 + 30);
    assert_eq!(summary.highest_hit, 30);
    assert_eq!(
        summary.most_damage.as_ref().map(|standout| standout.unit),
        Some(arena.crown)
    );
    assert_eq!(summary.most_damage.map(|standout| standout.value), Some(60));
    assert_eq!(
        summary.most_kills.map(|standout| standout.name),
        Some("Knight".to_owned())
    );
    assert_eq!(
        summary.toughest_survivor.map(|standout| standout.value),
        Some(12)
    );
    assert!(summary.heroes.is_empty());
}

proptest! {
    #[test]
    fn promotion_never_lifts_hp_past_boosted_maximum(damage in 0i32..44, passes in 1usize..4) {
        let mut arena = arena();
        let mut events = Vec::new();
        world::apply(
            &mut arena.world,
            Command::DealDamage {
                source: None,
                target: arena.crown,
                amount: damage,
                critical: false,
            },
            &mut events,
        );
        hit(&mut arena.world, arena.crown, arena.horde, 20);
        let progression = Progression::default();
        let mut promotions = 0;
        for _ in 0..passes {
            promotions += promote_pass(&mut arena.world, &progression).len();
        }
        let knight = query::unit(&arena.world, arena.crown).expect("knight");
        // The ogre was hurt but has not survived long enough to qualify.
        prop_assert_eq!(promotions, 1);
        prop_assert!(knight.hp <= knight.max_hp);
        prop_assert_eq!(knight.hp, 45 - damage + 5);
    }
}
