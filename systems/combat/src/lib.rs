#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turret fire and homing projectiles.
//!
//! Ready turrets lock onto the nearest intruder in range and launch a
//! projectile that follows the target's live position. Projectiles whose
//! target has vanished are dropped without dealing damage.

mod targeting;

use std::time::Duration;

use nightmare_dorm_core::{
    Command, Event, Hit, IntruderId, IntruderView, ProjectileId, ProjectileSnapshot, RoomId,
    TurretView, WorldPoint, WorldRect,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use targeting::{nearest_in_range, Lock};

/// Tunable combat constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Distance at which a projectile connects with its target.
    pub hit_radius: f32,
    /// Gold granted per kill before the wave bonus.
    pub kill_reward: u32,
    /// Region outside which projectiles are discarded.
    pub arena: WorldRect,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            projectile_speed: 300.0,
            hit_radius: 15.0,
            kill_reward: 5,
            arena: WorldRect::new(-100.0, -150.0, 650.0, 1050.0),
        }
    }
}

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    room: RoomId,
    position: WorldPoint,
    target: IntruderId,
    damage: u32,
}

/// Combat system owning every projectile in flight.
#[derive(Debug)]
pub struct Combat {
    tuning: CombatTuning,
    projectiles: Vec<Projectile>,
    next_id: u32,
}

impl Combat {
    /// Creates a combat system with no projectiles in flight.
    #[must_use]
    pub fn new(tuning: CombatTuning) -> Self {
        Self {
            tuning,
            projectiles: Vec::new(),
            next_id: 0,
        }
    }

    /// Fires every ready turret and advances projectiles by `dt`.
    ///
    /// Each shot queues a [`Command::FireTurret`] so the world restarts that
    /// turret's cooldown. `strike` applies projectile damage to an intruder.
    /// Kills pay the base reward plus the latest `wave` number.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<F>(
        &mut self,
        dt: Duration,
        wave: u32,
        turrets: &TurretView,
        intruders: &IntruderView,
        mut strike: F,
        commands: &mut Vec<Command>,
        out: &mut Vec<Event>,
    ) where
        F: FnMut(IntruderId, u32) -> Hit,
    {
        self.fire(turrets, intruders, commands, out);
        self.advance(dt, wave, intruders, &mut strike, out);
    }

    fn fire(
        &mut self,
        turrets: &TurretView,
        intruders: &IntruderView,
        commands: &mut Vec<Command>,
        out: &mut Vec<Event>,
    ) {
        if intruders.is_empty() {
            return;
        }

        for turret in turrets.iter().filter(|turret| turret.ready) {
            let Some(lock) = nearest_in_range(turret, intruders) else {
                continue;
            };

            let id = ProjectileId::new(self.next_id);
            self.next_id = self.next_id.saturating_add(1);
            self.projectiles.push(Projectile {
                id,
                room: turret.room,
                position: turret.position,
                target: lock.intruder,
                damage: turret.damage,
            });

            commands.push(Command::FireTurret {
                room: turret.room,
                cell: turret.cell,
            });
            out.push(Event::ProjectileFired {
                projectile: id,
                room: turret.room,
                target: lock.intruder,
            });
        }
    }

    fn advance<F>(
        &mut self,
        dt: Duration,
        wave: u32,
        intruders: &IntruderView,
        strike: &mut F,
        out: &mut Vec<Event>,
    ) where
        F: FnMut(IntruderId, u32) -> Hit,
    {
        let step = self.tuning.projectile_speed * dt.as_secs_f32();
        let CombatTuning {
            hit_radius,
            kill_reward,
            arena,
            ..
        } = self.tuning;
        let reward = kill_reward.saturating_add(wave);

        self.projectiles.retain_mut(|projectile| {
            let Some(target) = intruders.get(projectile.target) else {
                return false;
            };

            projectile.position = projectile.position.step_toward(target.position, step);
            if projectile.position.distance(target.position) <= hit_radius {
                match strike(projectile.target, projectile.damage) {
                    Hit::Killed { .. } => {
                        debug!(
                            projectile = projectile.id.get(),
                            intruder = projectile.target.get(),
                            reward,
                            "intruder killed"
                        );
                        out.push(Event::IntruderKilled {
                            intruder: projectile.target,
                            room: projectile.room,
                            reward,
                        });
                    }
                    Hit::Wounded { remaining } => {
                        debug!(
                            projectile = projectile.id.get(),
                            intruder = projectile.target.get(),
                            remaining,
                            "projectile hit"
                        );
                    }
                    Hit::Stale => {}
                }
                return false;
            }

            arena.contains(projectile.position)
        });
    }

    /// Snapshots of every projectile in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        self.projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                target: projectile.target,
                damage: projectile.damage,
            })
            .collect()
    }

    /// Discards every projectile in flight.
    pub fn clear(&mut self) {
        self.projectiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightmare_dorm_core::{CellIndex, IntruderMode, IntruderSnapshot, TurretSnapshot};

    fn intruder(id: u32, x: f32, y: f32) -> IntruderSnapshot {
        IntruderSnapshot {
            id: IntruderId::new(id),
            position: WorldPoint::new(x, y),
            hp: 50.0,
            max_hp: 50.0,
            damage: 10,
            mode: IntruderMode::Idle,
            target: None,
            wave: 2,
        }
    }

    fn turret(ready: bool) -> TurretView {
        TurretView::from_snapshots(vec![TurretSnapshot {
            room: RoomId::new(1),
            cell: CellIndex::new(1),
            position: WorldPoint::new(0.0, 0.0),
            damage: 5,
            range: 150.0,
            ready,
        }])
    }

    #[test]
    fn cooling_turret_holds_fire() {
        let mut combat = Combat::new(CombatTuning::default());
        let intruders = IntruderView::from_snapshots(vec![intruder(0, 10.0, 0.0)]);
        let mut commands = Vec::new();
        let mut events = Vec::new();

        combat.handle(
            Duration::from_millis(100),
            1,
            &turret(false),
            &intruders,
            |_, _| Hit::Stale,
            &mut commands,
            &mut events,
        );

        assert!(commands.is_empty());
        assert!(combat.projectiles().is_empty());
    }

    #[test]
    fn kill_reward_uses_latest_wave() {
        let mut combat = Combat::new(CombatTuning::default());
        let intruders = IntruderView::from_snapshots(vec![intruder(3, 20.0, 0.0)]);
        let mut commands = Vec::new();
        let mut events = Vec::new();

        combat.handle(
            Duration::from_millis(100),
            3,
            &turret(true),
            &intruders,
            |_, _| Hit::Killed { wave: 1 },
            &mut commands,
            &mut events,
        );

        assert_eq!(
            commands,
            vec![Command::FireTurret {
                room: RoomId::new(1),
                cell: CellIndex::new(1),
            }]
        );
        assert!(events.contains(&Event::IntruderKilled {
            intruder: IntruderId::new(3),
            room: RoomId::new(1),
            reward: 8,
        }));
        assert!(combat.projectiles().is_empty());
    }

    #[test]
    fn projectile_for_vanished_target_is_discarded() {
        let mut combat = Combat::new(CombatTuning::default());
        let far = IntruderView::from_snapshots(vec![intruder(0, 140.0, 0.0)]);
        let mut commands = Vec::new();
        let mut events = Vec::new();
        let mut strikes = 0;

        combat.handle(
            Duration::from_millis(100),
            1,
            &turret(true),
            &far,
            |_, _| {
                strikes += 1;
                Hit::Stale
            },
            &mut commands,
            &mut events,
        );
        assert_eq!(combat.projectiles().len(), 1);

        combat.handle(
            Duration::from_millis(100),
            1,
            &turret(false),
            &IntruderView::default(),
            |_, _| {
                strikes += 1;
                Hit::Stale
            },
            &mut commands,
            &mut events,
        );
        assert!(combat.projectiles().is_empty());
        assert_eq!(strikes, 0);
    }
}
