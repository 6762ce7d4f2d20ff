use std::time::Duration;

use nightmare_dorm_core::{
    Event, Hit, IntruderId, IntruderMode, IntruderSnapshot, OccupantId, RoomId, WorldPoint,
};
use nightmare_dorm_system_intruders::{ChaseTuning, Horde, IntruderTuning, Quarry};
use nightmare_dorm_world::{apply, query, World};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const STEP: Duration = Duration::from_millis(100);
const SPAWN: WorldPoint = WorldPoint::new(225.0, -50.0);

fn resting_world(rooms: &[u32]) -> World {
    let mut world = World::new();
    for room in rooms {
        let occupant = world.enrol(format!("resident {room}"), false, 0.0);
        let _ = world
            .claim_room(occupant, RoomId::new(*room))
            .expect("room is free");
    }
    apply(&mut world, nightmare_dorm_core::Command::BeginResting, &mut Vec::new());
    world
}

fn tick(
    horde: &mut Horde,
    world: &mut World,
    quarries: &[Quarry],
    rng: &mut ChaCha8Rng,
    events: &mut Vec<Event>,
) {
    let rooms = query::room_view(world);
    horde.handle(
        STEP,
        &rooms,
        quarries,
        rng,
        |room, damage| world.take_door_damage(room, damage),
        events,
    );
}

fn only(horde: &Horde) -> IntruderSnapshot {
    horde.view().into_vec()[0]
}

fn run_until_attacking(
    horde: &mut Horde,
    world: &mut World,
    rng: &mut ChaCha8Rng,
    events: &mut Vec<Event>,
) -> IntruderSnapshot {
    for _ in 0..60 {
        tick(horde, world, &[], rng, events);
        if only(horde).mode == IntruderMode::Attack {
            return only(horde);
        }
    }
    panic!("intruder never selected a target");
}

#[test]
fn badly_hurt_attacker_retreats_on_next_update() {
    let mut world = resting_world(&[1]);
    let mut horde = Horde::new(IntruderTuning::default());
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut events = Vec::new();
    let id = horde.spawn(0, SPAWN, &mut rng, &mut events);

    let attacking = run_until_attacking(&mut horde, &mut world, &mut rng, &mut events);
    assert_eq!(attacking.max_hp, 50.0);
    assert_eq!(attacking.target, Some(RoomId::new(1)));

    assert_eq!(horde.strike(id, 41), Hit::Wounded { remaining: 9.0 });
    assert_eq!(only(&horde).mode, IntruderMode::Attack);

    events.clear();
    tick(&mut horde, &mut world, &[], &mut rng, &mut events);

    let snapshot = only(&horde);
    assert_eq!(snapshot.mode, IntruderMode::Retreat);
    assert_eq!(snapshot.target, None);
    assert_eq!(
        events,
        vec![Event::IntruderModeChanged {
            intruder: id,
            from: IntruderMode::Attack,
            to: IntruderMode::Retreat,
        }]
    );
}

#[test]
fn retreating_intruder_heals_before_idling() {
    let mut world = resting_world(&[1]);
    let mut horde = Horde::new(IntruderTuning::default());
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut events = Vec::new();
    let id = horde.spawn(0, SPAWN, &mut rng, &mut events);

    let _ = run_until_attacking(&mut horde, &mut world, &mut rng, &mut events);
    let _ = horde.strike(id, 45);

    let mut healed = None;
    for _ in 0..400 {
        events.clear();
        tick(&mut horde, &mut world, &[], &mut rng, &mut events);
        let snapshot = only(&horde);
        if snapshot.mode == IntruderMode::Idle {
            healed = Some(snapshot);
            break;
        }
    }

    let snapshot = healed.expect("intruder recovered");
    assert!(snapshot.hp >= 40.0);
    assert!(snapshot.hp <= snapshot.max_hp);
    assert!(snapshot.position.distance(SPAWN) <= 20.0);
}

#[test]
fn breaking_a_door_is_reported_once() {
    let mut world = resting_world(&[1]);
    let mut horde = Horde::new(IntruderTuning::default());
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let mut events = Vec::new();
    let _ = horde.spawn(0, SPAWN, &mut rng, &mut events);
    let _ = horde.spawn(0, WorldPoint::new(50.0, 375.0), &mut rng, &mut events);

    for _ in 0..900 {
        tick(&mut horde, &mut world, &[], &mut rng, &mut events);
    }

    let broken = events
        .iter()
        .filter(|event| matches!(event, Event::RoomBroken { .. }))
        .count();
    assert_eq!(broken, 1);
    assert_eq!(query::door(&world, RoomId::new(1)).map(|door| door.hp), Some(0));
    assert!(horde
        .view()
        .iter()
        .all(|snapshot| snapshot.mode == IntruderMode::Idle));
}

#[test]
fn target_selection_is_not_nearest_first() {
    let mut chosen = Vec::new();
    for seed in 0..40 {
        let mut world = resting_world(&[1, 6]);
        let mut horde = Horde::new(IntruderTuning::default());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut events = Vec::new();
        let _ = horde.spawn(0, SPAWN, &mut rng, &mut events);

        let attacking = run_until_attacking(&mut horde, &mut world, &mut rng, &mut events);
        chosen.push(attacking.target);
    }

    assert!(chosen.contains(&Some(RoomId::new(1))));
    assert!(chosen.contains(&Some(RoomId::new(6))));
}

#[test]
fn idle_without_targets_keeps_wandering() {
    let mut world = World::new();
    let mut horde = Horde::new(IntruderTuning::default());
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut events = Vec::new();
    let _ = horde.spawn(0, SPAWN, &mut rng, &mut events);

    for _ in 0..200 {
        tick(&mut horde, &mut world, &[], &mut rng, &mut events);
    }
    assert_eq!(only(&horde).mode, IntruderMode::Idle);
}

#[test]
fn chase_is_gated_by_capability_and_exposure() {
    let quarry = Quarry {
        occupant: OccupantId::new(0),
        position: WorldPoint::new(225.0, 100.0),
        exposed: true,
    };

    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let mut canonical = Horde::new(IntruderTuning::default());
    let _ = canonical.spawn(0, SPAWN, &mut rng, &mut Vec::new());
    tick(&mut canonical, &mut world, &[quarry], &mut rng, &mut Vec::new());
    assert_eq!(only(&canonical).mode, IntruderMode::Idle);

    let tuning = IntruderTuning {
        chase: Some(ChaseTuning::default()),
        ..IntruderTuning::default()
    };
    let mut hunters = Horde::new(tuning);
    let hidden = Quarry {
        exposed: false,
        ..quarry
    };
    let _ = hunters.spawn(0, SPAWN, &mut rng, &mut Vec::new());
    tick(&mut hunters, &mut world, &[hidden], &mut rng, &mut Vec::new());
    assert_eq!(only(&hunters).mode, IntruderMode::Idle);

    let mut events = Vec::new();
    tick(&mut hunters, &mut world, &[quarry], &mut rng, &mut events);
    assert_eq!(only(&hunters).mode, IntruderMode::Chase);

    for _ in 0..100 {
        tick(&mut hunters, &mut world, &[quarry], &mut rng, &mut events);
        if events
            .iter()
            .any(|event| matches!(event, Event::OccupantCaught { .. }))
        {
            break;
        }
    }
    assert!(events.contains(&Event::OccupantCaught {
        occupant: OccupantId::new(0),
        intruder: IntruderId::new(0),
    }));
    assert_eq!(only(&hunters).mode, IntruderMode::Idle);
}

#[derive(Clone, Debug)]
enum Step {
    Advance,
    Wound(u32),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => Just(Step::Advance),
        1 => (1u32..20).prop_map(Step::Wound),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn mode_transitions_follow_the_state_machine(
        seed in any::<u64>(),
        steps in proptest::collection::vec(step_strategy(), 1..400),
    ) {
        let tuning = IntruderTuning::default();
        let mut world = resting_world(&[1, 2, 3]);
        let mut horde = Horde::new(tuning.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let id = horde.spawn(0, SPAWN, &mut rng, &mut Vec::new());

        for step in steps {
            let Some(before) = horde.view().get(id).copied() else {
                break;
            };
            match step {
                Step::Wound(damage) => {
                    let _ = horde.strike(id, damage);
                }
                Step::Advance => {
                    let mut events = Vec::new();
                    tick(&mut horde, &mut world, &[], &mut rng, &mut events);
                    let after = horde.view().get(id).copied().expect("alive intruder");

                    for event in &events {
                        let Event::IntruderModeChanged { from, to, .. } = event else {
                            continue;
                        };
                        prop_assert_eq!(*from, before.mode);
                        prop_assert_eq!(*to, after.mode);
                        if *to == IntruderMode::Retreat {
                            prop_assert_eq!(*from, IntruderMode::Attack);
                            prop_assert!(before.hp / before.max_hp < tuning.retreat_threshold);
                        }
                        if *from == IntruderMode::Retreat {
                            prop_assert_eq!(*to, IntruderMode::Idle);
                            prop_assert!(after.hp >= tuning.recovery_fraction * after.max_hp);
                        }
                        prop_assert!(*to != IntruderMode::Chase);
                    }
                    prop_assert!(after.hp >= 0.0 && after.hp <= after.max_hp);
                }
            }
        }
    }
}
