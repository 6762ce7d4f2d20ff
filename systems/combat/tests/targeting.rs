use std::time::Duration;

use nightmare_dorm_core::{
    CellIndex, Event, Hit, IntruderId, IntruderMode, IntruderSnapshot, IntruderView, RoomId,
    TurretSnapshot, TurretView, WorldPoint,
};
use nightmare_dorm_system_combat::{nearest_in_range, Combat, CombatTuning};
use proptest::prelude::*;

fn turret_at(x: f32, y: f32) -> TurretSnapshot {
    TurretSnapshot {
        room: RoomId::new(2),
        cell: CellIndex::new(3),
        position: WorldPoint::new(x, y),
        damage: 5,
        range: 150.0,
        ready: true,
    }
}

fn intruder(id: u32, position: WorldPoint) -> IntruderSnapshot {
    IntruderSnapshot {
        id: IntruderId::new(id),
        position,
        hp: 55.0,
        max_hp: 55.0,
        damage: 11,
        mode: IntruderMode::Attack,
        target: Some(RoomId::new(2)),
        wave: 1,
    }
}

#[test]
fn intruder_exactly_at_range_is_eligible() {
    let turret = turret_at(0.0, 0.0);
    let view = IntruderView::from_snapshots(vec![
        intruder(0, WorldPoint::new(150.0, 0.0)),
        intruder(1, WorldPoint::new(0.0, 150.5)),
    ]);

    let lock = nearest_in_range(&turret, &view).expect("edge intruder in range");
    assert_eq!(lock.intruder, IntruderId::new(0));
}

#[test]
fn out_of_range_intruders_are_ignored() {
    let turret = turret_at(0.0, 0.0);
    let view = IntruderView::from_snapshots(vec![intruder(0, WorldPoint::new(200.0, 0.0))]);
    assert!(nearest_in_range(&turret, &view).is_none());
}

#[test]
fn equal_distances_prefer_lower_identifier() {
    let turret = turret_at(0.0, 0.0);
    let view = IntruderView::from_snapshots(vec![
        intruder(7, WorldPoint::new(-30.0, 0.0)),
        intruder(4, WorldPoint::new(0.0, 30.0)),
    ]);
    let lock = nearest_in_range(&turret, &view).expect("both in range");
    assert_eq!(lock.intruder, IntruderId::new(4));
}

#[test]
fn projectile_homes_onto_moving_target() {
    let mut combat = Combat::new(CombatTuning::default());
    let turrets = TurretView::from_snapshots(vec![turret_at(0.0, 0.0)]);
    let mut commands = Vec::new();
    let mut events = Vec::new();
    let mut hits = Vec::new();

    let start = IntruderView::from_snapshots(vec![intruder(0, WorldPoint::new(100.0, 0.0))]);
    combat.handle(
        Duration::from_millis(100),
        1,
        &turrets,
        &start,
        |id, damage| {
            hits.push((id, damage));
            Hit::Wounded { remaining: 50.0 }
        },
        &mut commands,
        &mut events,
    );
    assert_eq!(combat.projectiles().len(), 1);

    let idle = TurretView::from_snapshots(vec![TurretSnapshot {
        ready: false,
        ..turret_at(0.0, 0.0)
    }]);
    let moved = IntruderView::from_snapshots(vec![intruder(0, WorldPoint::new(30.0, 60.0))]);
    for _ in 0..5 {
        combat.handle(
            Duration::from_millis(100),
            1,
            &idle,
            &moved,
            |id, damage| {
                hits.push((id, damage));
                Hit::Wounded { remaining: 50.0 }
            },
            &mut commands,
            &mut events,
        );
    }

    assert_eq!(hits, vec![(IntruderId::new(0), 5)]);
    assert!(combat.projectiles().is_empty());
    assert_eq!(commands.len(), 1);
    assert!(matches!(
        events[0],
        Event::ProjectileFired {
            room,
            target,
            ..
        } if room == RoomId::new(2) && target == IntruderId::new(0)
    ));
}

proptest! {
    #[test]
    fn fired_projectile_targets_the_closest_intruder(
        positions in proptest::collection::vec((-200.0f32..200.0, -200.0f32..200.0), 1..12),
    ) {
        let turret = turret_at(0.0, 0.0);
        let snapshots: Vec<_> = positions
            .iter()
            .enumerate()
            .map(|(index, (x, y))| intruder(index as u32, WorldPoint::new(*x, *y)))
            .collect();
        let view = IntruderView::from_snapshots(snapshots.clone());

        let in_range: Vec<_> = snapshots
            .iter()
            .filter(|snapshot| {
                turret.position.distance_squared(snapshot.position) <= turret.range * turret.range
            })
            .collect();

        let mut combat = Combat::new(CombatTuning::default());
        let mut commands = Vec::new();
        let mut events = Vec::new();
        combat.handle(
            Duration::ZERO,
            1,
            &TurretView::from_snapshots(vec![turret]),
            &view,
            |_, _| Hit::Stale,
            &mut commands,
            &mut events,
        );

        let fired = events.iter().find_map(|event| match event {
            Event::ProjectileFired { target, .. } => Some(*target),
            _ => None,
        });

        match fired {
            None => prop_assert!(in_range.is_empty()),
            Some(target) => {
                let chosen = view.get(target).expect("target exists");
                let chosen_distance = turret.position.distance_squared(chosen.position);
                prop_assert!(chosen_distance <= turret.range * turret.range);
                for other in &in_range {
                    prop_assert!(
                        chosen_distance <= turret.position.distance_squared(other.position)
                    );
                }
            }
        }
    }
}
