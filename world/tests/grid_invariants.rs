use proptest::prelude::*;
use skirmish_core::{presets, Command, EntityId, Event, Modifier, Position, TeamId};
use skirmish_world::{self as world, query, World};

const SIDE: u32 = 6;

#[derive(Clone, Debug)]
enum Op {
    PlaceHero { team: bool, x: u32, y: u32 },
    PlaceTower { team: bool, x: u32, y: u32 },
    Move { unit: u32, x: u32, y: u32 },
    Clear { x: u32, y: u32 },
    Damage { entity: u32, amount: u64 },
    Respawn { unit: u32, x: u32, y: u32 },
    EndTurn { team: bool },
}

fn coordinate() -> impl Strategy<Value = u32> {
    0..SIDE + 1
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), coordinate(), coordinate())
            .prop_map(|(team, x, y)| Op::PlaceHero { team, x, y }),
        (any::<bool>(), coordinate(), coordinate())
            .prop_map(|(team, x, y)| Op::PlaceTower { team, x, y }),
        (0_u32..12, coordinate(), coordinate()).prop_map(|(unit, x, y)| Op::Move { unit, x, y }),
        (coordinate(), coordinate()).prop_map(|(x, y)| Op::Clear { x, y }),
        (0_u32..12, 0_u64..2_000).prop_map(|(entity, amount)| Op::Damage { entity, amount }),
        (0_u32..12, coordinate(), coordinate())
            .prop_map(|(unit, x, y)| Op::Respawn { unit, x, y }),
        any::<bool>().prop_map(|team| Op::EndTurn { team }),
    ]
}

fn team(flag: bool) -> TeamId {
    if flag {
        TeamId::One
    } else {
        TeamId::Two
    }
}

fn command(op: Op) -> Command {
    match op {
        Op::PlaceHero { team: flag, x, y } => Command::PlaceEntity {
            team: team(flag),
            spec: presets::hero("Prop Hero"),
            position: Position::new(x, y),
        },
        Op::PlaceTower { team: flag, x, y } => Command::PlaceEntity {
            team: team(flag),
            spec: presets::battle_tower("Prop Tower"),
            position: Position::new(x, y),
        },
        Op::Move { unit, x, y } => Command::MoveUnit {
            unit: EntityId::new(unit),
            destination: Position::new(x, y),
        },
        Op::Clear { x, y } => Command::ClearTile {
            position: Position::new(x, y),
        },
        Op::Damage { entity, amount } => Command::DamageEntity {
            entity: EntityId::new(entity),
            amount,
        },
        Op::Respawn { unit, x, y } => Command::Respawn {
            unit: EntityId::new(unit),
            position: Position::new(x, y),
        },
        Op::EndTurn { team: flag } => Command::EndTurn { team: team(flag) },
    }
}

fn assert_grid_matches_entities(world: &World) {
    let occupancy = query::occupancy_view(world);
    let entities = query::entity_view(world);

    for snapshot in entities.iter() {
        if let Some(position) = snapshot.position {
            let occupant = occupancy.occupant(position).map(|o| o.entity());
            assert_eq!(occupant, Some(snapshot.id), "{snapshot:?} not on its tile");
            assert_eq!(
                occupancy.occupant(position).map(|o| o.is_unit()),
                Some(snapshot.is_unit())
            );
        }
    }

    let occupied = occupancy.iter().flatten().count();
    let placed = entities
        .iter()
        .filter(|snapshot| snapshot.position.is_some())
        .count();
    assert_eq!(occupied, placed);
}

proptest! {
    #[test]
    fn grid_and_entity_positions_stay_consistent(ops in prop::collection::vec(op(), 1..60)) {
        let mut world = World::with_dimensions(SIDE, SIDE);
        for op in ops {
            let mut events = Vec::new();
            world::apply(&mut world, command(op), &mut events);
            assert_grid_matches_entities(&world);
        }
    }

    #[test]
    fn accepted_moves_stay_within_budget(
        start in (0..SIDE, 0..SIDE),
        targets in prop::collection::vec((0..SIDE, 0..SIDE), 1..20),
    ) {
        let mut world = World::with_dimensions(SIDE, SIDE);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::PlaceEntity {
                team: TeamId::One,
                spec: presets::villager("Walker"),
                position: Position::new(start.0, start.1),
            },
            &mut events,
        );
        let unit = EntityId::new(0);

        for (x, y) in targets {
            events.clear();
            world::apply(
                &mut world,
                Command::MoveUnit { unit, destination: Position::new(x, y) },
                &mut events,
            );
            world::apply(&mut world, Command::EndTurn { team: TeamId::One }, &mut events);
            for event in &events {
                if let Event::UnitMoved { from, to, .. } = event {
                    prop_assert!(from.manhattan_distance(*to) <= 2);
                }
            }
        }
    }

    #[test]
    fn removing_a_rune_restores_previous_stats(
        health in 0.5_f64..3.0,
        attack in 0.5_f64..3.0,
        crit_rate in -500_i64..500,
        first_level_ups in 0_u64..2,
    ) {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::PlaceEntity {
                team: TeamId::One,
                spec: presets::hero("Runed"),
                position: Position::new(0, 0),
            },
            &mut events,
        );
        let hero = EntityId::new(0);
        if first_level_ups > 0 {
            world::apply(&mut world, Command::GrantExperience { entity: hero, amount: 10 }, &mut events);
        }
        world::apply(
            &mut world,
            Command::ApplyModifier { entity: hero, modifier: Modifier::upgrade("Base Upgrade", 0) },
            &mut events,
        );
        let before = query::entity(&world, hero).map(|snapshot| snapshot.stats);

        let rune = Modifier {
            health,
            attack,
            crit_rate,
            ..Modifier::rune("Prop Rune", 5)
        };
        world::apply(&mut world, Command::ApplyModifier { entity: hero, modifier: rune }, &mut events);
        world::apply(
            &mut world,
            Command::RemoveModifier { entity: hero, name: "Prop Rune".to_owned() },
            &mut events,
        );

        prop_assert_eq!(query::entity(&world, hero).map(|snapshot| snapshot.stats), before);
    }
}
