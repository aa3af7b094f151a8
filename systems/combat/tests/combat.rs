use proptest::prelude::*;
use skirmish_core::{CellCoord, Command, Event, Faction, ScriptedDice, UnitId, UnitKind};
use skirmish_system_combat::{base_damage, CombatResolver};
use skirmish_world::{self as world, query, World};

fn skirmish(attacker: UnitKind, defender: UnitKind) -> (World, UnitId, UnitId) {
    let mut world = World::new();
    let mut events = Vec::new();
    let first = world::place_unit(
        &mut world,
        attacker,
        Faction::A,
        CellCoord::new(8, 8),
        &mut events,
    )
    .expect("attacker placed");
    let second = world::place_unit(
        &mut world,
        defender,
        Faction::B,
        CellCoord::new(7, 8),
        &mut events,
    )
    .expect("defender placed");
    world::apply(&mut world, Command::StartBattle, &mut events);
    (world, first, second)
}

fn any_kind() -> impl Strategy<Value = UnitKind> {
    proptest::sample::select(UnitKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn plain_strikes_always_deal_at_least_one(attacker in any_kind(), defender in any_kind()) {
        prop_assume!(!attacker.archetype().has_area_attack);
        let (mut world, first, second) = skirmish(attacker, defender);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        let outcome = resolver.resolve_attack(
            &mut world,
            first,
            second,
            &mut ScriptedDice::never(),
            &mut events,
        );
        prop_assert!(outcome.performed);
        prop_assert!(outcome.damage_dealt >= 1);

        let striker = query::unit(&world, first).expect("attacker survives its own strike");
        let victim = query::any_unit(&world, second).expect("defender recorded");
        let expected = base_damage(&striker, &victim);
        prop_assert_eq!(outcome.damage_dealt, u32::try_from(expected).unwrap_or(0));
    }

    #[test]
    fn hit_points_never_drop_below_zero(hits in 1usize..8) {
        let (mut world, first, second) = skirmish(UnitKind::Berserker, UnitKind::Goblin);
        let resolver = CombatResolver::default();
        let mut events = Vec::new();
        for _ in 0..hits {
            let _ = resolver.resolve_attack(
                &mut world,
                first,
                second,
                &mut ScriptedDice::new([], 0.0),
                &mut events,
            );
        }
        let goblin = query::any_unit(&world, second).expect("goblin recorded");
        prop_assert!(goblin.hp >= 0);
        for event in &events {
            if let Event::UnitDamaged { remaining_hp, .. } = event {
                prop_assert!(*remaining_hp >= 0);
            }
        }
    }
}

#[test]
fn one_hit_kill_reports_death_and_credits_the_kill() {
    let (mut world, berserker, goblin) = skirmish(UnitKind::Berserker, UnitKind::Goblin);
    let resolver = CombatResolver::default();
    let mut events = Vec::new();
    let outcome = resolver.resolve_attack(
        &mut world,
        berserker,
        goblin,
        &mut ScriptedDice::new([0.9, 0.0], 0.9),
        &mut events,
    );
    assert!(outcome.target_died);
    assert!(events.contains(&Event::UnitDied {
        unit: goblin,
        killer: Some(berserker),
    }));
    assert_eq!(query::unit(&world, berserker).expect("berserker").record.kills, 1);
}
