#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Intruder system driving the hostile agents of a session.
//!
//! Every intruder runs the same state machine. Idle intruders wander until
//! their dwell runs out and then lock onto a random eligible room. Attackers
//! walk to a stand-off point outside the door and strike it on a fixed
//! cadence. Badly hurt attackers retreat to their spawn point and heal. The
//! chase state is only reachable when [`IntruderTuning::chase`] is set and
//! exposed [`Quarry`] positions are supplied.

mod tuning;

use std::time::Duration;

use nightmare_dorm_core::{
    Event, Hit, IntruderId, IntruderMode, IntruderSnapshot, IntruderView, OccupantId, RoomId,
    RoomView, WorldPoint,
};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

pub use tuning::{ChaseTuning, IntruderTuning, Quarry};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Behaviour {
    Idle {
        dwell: f32,
        patience: f32,
        wander: WorldPoint,
    },
    Attack {
        room: RoomId,
        timer: f32,
    },
    Retreat,
    Chase {
        quarry: OccupantId,
    },
}

impl Behaviour {
    fn idle<R: Rng + ?Sized>(tuning: &IntruderTuning, rng: &mut R, wander: WorldPoint) -> Self {
        let patience = if tuning.dwell_max > tuning.dwell_min {
            rng.gen_range(tuning.dwell_min..tuning.dwell_max)
        } else {
            tuning.dwell_min
        };
        Self::Idle {
            dwell: 0.0,
            patience,
            wander,
        }
    }

    const fn mode(&self) -> IntruderMode {
        match self {
            Self::Idle { .. } => IntruderMode::Idle,
            Self::Attack { .. } => IntruderMode::Attack,
            Self::Retreat => IntruderMode::Retreat,
            Self::Chase { .. } => IntruderMode::Chase,
        }
    }

    const fn target(&self) -> Option<RoomId> {
        match self {
            Self::Attack { room, .. } => Some(*room),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Intruder {
    id: IntruderId,
    wave: u32,
    spawn: WorldPoint,
    position: WorldPoint,
    hp: f32,
    max_hp: f32,
    damage: u32,
    behaviour: Behaviour,
    dead: bool,
}

impl Intruder {
    fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        self.hp / self.max_hp
    }

    fn enter(&mut self, next: Behaviour, out: &mut Vec<Event>) {
        let from = self.behaviour.mode();
        let to = next.mode();
        self.behaviour = next;
        if from != to {
            debug!(intruder = self.id.get(), ?from, ?to, "intruder mode changed");
            out.push(Event::IntruderModeChanged {
                intruder: self.id,
                from,
                to,
            });
        }
    }

    fn snapshot(&self) -> IntruderSnapshot {
        IntruderSnapshot {
            id: self.id,
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            damage: self.damage,
            mode: self.behaviour.mode(),
            target: self.behaviour.target(),
            wave: self.wave,
        }
    }
}

/// Every intruder of a session along with its state machine.
#[derive(Debug)]
pub struct Horde {
    tuning: IntruderTuning,
    intruders: Vec<Intruder>,
    next_id: u32,
    targets: Vec<RoomId>,
}

impl Horde {
    /// Creates an empty horde using the provided tuning.
    #[must_use]
    pub fn new(tuning: IntruderTuning) -> Self {
        Self {
            tuning,
            intruders: Vec::new(),
            next_id: 0,
            targets: Vec::new(),
        }
    }

    /// Tuning shared by every intruder.
    #[must_use]
    pub fn tuning(&self) -> &IntruderTuning {
        &self.tuning
    }

    /// Spawns an idle intruder whose stats scale with the wave index.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        wave: u32,
        position: WorldPoint,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> IntruderId {
        let tuning = &self.tuning;
        let scale = 1.0 + f64::from(wave) * tuning.difficulty;
        let max_hp = (f64::from(tuning.base_hp) * scale).floor() as f32;
        let damage = (f64::from(tuning.base_damage) * scale).floor() as u32;
        let wander = position.offset(tuning.first_wander.x(), tuning.first_wander.y());

        let id = IntruderId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.intruders.push(Intruder {
            id,
            wave,
            spawn: position,
            position,
            hp: max_hp,
            max_hp,
            damage,
            behaviour: Behaviour::idle(tuning, rng, wander),
            dead: false,
        });

        debug!(intruder = id.get(), wave, max_hp, damage, "intruder spawned");
        out.push(Event::IntruderSpawned {
            intruder: id,
            wave,
            position,
        });
        id
    }

    /// Advances every living intruder by `dt`.
    ///
    /// `strike` applies door damage to a room and reports whether that strike
    /// broke the door. A broken door is reported as [`Event::RoomBroken`]
    /// once, by the intruder whose strike broke it.
    pub fn handle<R, F>(
        &mut self,
        dt: Duration,
        rooms: &RoomView,
        quarries: &[Quarry],
        rng: &mut R,
        mut strike: F,
        out: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
        F: FnMut(RoomId, u32) -> bool,
    {
        let seconds = dt.as_secs_f32();
        if seconds <= 0.0 {
            return;
        }

        self.targets.clear();
        self.targets.extend(
            rooms
                .iter()
                .filter(|room| room.is_target())
                .map(|room| room.id),
        );

        let tuning = &self.tuning;
        for intruder in self.intruders.iter_mut().filter(|entry| !entry.dead) {
            let next = match intruder.behaviour {
                Behaviour::Idle { .. } => {
                    idle(tuning, intruder, seconds, &self.targets, quarries, rng)
                }
                Behaviour::Attack { .. } => {
                    attack(tuning, intruder, seconds, rooms, rng, &mut strike, out)
                }
                Behaviour::Retreat => retreat(tuning, intruder, seconds, rng),
                Behaviour::Chase { .. } => chase(tuning, intruder, seconds, quarries, rng, out),
            };
            if let Some(next) = next {
                intruder.enter(next, out);
            }
        }
    }

    /// Applies projectile damage to an intruder.
    pub fn strike(&mut self, id: IntruderId, damage: u32) -> Hit {
        let Some(intruder) = self
            .intruders
            .iter_mut()
            .find(|entry| entry.id == id && !entry.dead)
        else {
            return Hit::Stale;
        };

        intruder.hp = (intruder.hp - damage as f32).max(0.0);
        if intruder.hp > 0.0 {
            return Hit::Wounded {
                remaining: intruder.hp,
            };
        }

        intruder.dead = true;
        debug!(intruder = id.get(), wave = intruder.wave, "intruder killed");
        Hit::Killed {
            wave: intruder.wave,
        }
    }

    /// Removes dead intruders, returning how many were dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.intruders.len();
        self.intruders.retain(|entry| !entry.dead);
        before - self.intruders.len()
    }

    /// Removes every intruder.
    pub fn clear(&mut self) {
        self.intruders.clear();
    }

    /// Captures a read-only view of every living intruder.
    #[must_use]
    pub fn view(&self) -> IntruderView {
        IntruderView::from_snapshots(
            self.intruders
                .iter()
                .filter(|entry| !entry.dead)
                .map(Intruder::snapshot)
                .collect(),
        )
    }

    /// Number of living intruders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.intruders.iter().filter(|entry| !entry.dead).count()
    }

    /// Reports whether no intruder is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn random_wander<R: Rng + ?Sized>(tuning: &IntruderTuning, rng: &mut R) -> WorldPoint {
    let u = rng.gen();
    let v = rng.gen();
    tuning.wander_area.lerp(u, v)
}

fn fresh_idle<R: Rng + ?Sized>(tuning: &IntruderTuning, rng: &mut R) -> Behaviour {
    let wander = random_wander(tuning, rng);
    Behaviour::idle(tuning, rng, wander)
}

fn idle<R: Rng + ?Sized>(
    tuning: &IntruderTuning,
    intruder: &mut Intruder,
    seconds: f32,
    targets: &[RoomId],
    quarries: &[Quarry],
    rng: &mut R,
) -> Option<Behaviour> {
    let Behaviour::Idle {
        dwell,
        patience,
        wander,
    } = &mut intruder.behaviour
    else {
        return None;
    };

    if intruder.position.distance(*wander) <= tuning.arrival_radius {
        *wander = random_wander(tuning, rng);
    } else {
        let step = tuning.speed * tuning.wander_factor * seconds;
        intruder.position = intruder.position.step_toward(*wander, step);
    }
    *dwell += seconds;

    if let Some(chase) = tuning.chase {
        let position = intruder.position;
        let spotted = quarries
            .iter()
            .filter(|quarry| quarry.exposed)
            .map(|quarry| (quarry, position.distance(quarry.position)))
            .filter(|(_, distance)| *distance <= chase.detection_range)
            .min_by(|(a, da), (b, db)| da.total_cmp(db).then(a.occupant.cmp(&b.occupant)));
        if let Some((quarry, _)) = spotted {
            return Some(Behaviour::Chase {
                quarry: quarry.occupant,
            });
        }
    }

    if *dwell < *patience {
        return None;
    }
    targets.choose(rng).map(|room| Behaviour::Attack {
        room: *room,
        timer: 0.0,
    })
}

fn attack<R, F>(
    tuning: &IntruderTuning,
    intruder: &mut Intruder,
    seconds: f32,
    rooms: &RoomView,
    rng: &mut R,
    strike: &mut F,
    out: &mut Vec<Event>,
) -> Option<Behaviour>
where
    R: Rng + ?Sized,
    F: FnMut(RoomId, u32) -> bool,
{
    let fraction = intruder.hp_fraction();
    let Behaviour::Attack { room, timer } = &mut intruder.behaviour else {
        return None;
    };
    let room = *room;

    let Some(target) = rooms.get(room).filter(|snapshot| snapshot.is_target()) else {
        return Some(fresh_idle(tuning, rng));
    };

    if fraction < tuning.retreat_threshold {
        return Some(Behaviour::Retreat);
    }

    let post = target
        .door_side
        .stand_off(target.door_point, tuning.stand_off);
    if intruder.position.distance(post) > tuning.attack_range {
        intruder.position = intruder.position.step_toward(post, tuning.speed * seconds);
        return None;
    }

    *timer += seconds;
    if *timer < tuning.attack_interval {
        return None;
    }
    *timer = 0.0;

    if !strike(room, intruder.damage) {
        return None;
    }

    debug!(intruder = intruder.id.get(), room = room.get(), "door broken");
    out.push(Event::RoomBroken { room });
    Some(fresh_idle(tuning, rng))
}

fn retreat<R: Rng + ?Sized>(
    tuning: &IntruderTuning,
    intruder: &mut Intruder,
    seconds: f32,
    rng: &mut R,
) -> Option<Behaviour> {
    if intruder.position.distance(intruder.spawn) > tuning.home_radius {
        let step = tuning.speed * tuning.retreat_factor * seconds;
        intruder.position = intruder.position.step_toward(intruder.spawn, step);
        return None;
    }

    intruder.hp += tuning.heal_rate * seconds;
    if intruder.hp_fraction() < tuning.recovery_fraction {
        return None;
    }
    intruder.hp = intruder.hp.min(intruder.max_hp);
    Some(fresh_idle(tuning, rng))
}

fn chase<R: Rng + ?Sized>(
    tuning: &IntruderTuning,
    intruder: &mut Intruder,
    seconds: f32,
    quarries: &[Quarry],
    rng: &mut R,
    out: &mut Vec<Event>,
) -> Option<Behaviour> {
    let Behaviour::Chase { quarry } = intruder.behaviour else {
        return None;
    };
    let quarry = quarries
        .iter()
        .find(|entry| entry.occupant == quarry && entry.exposed);
    let (Some(settings), Some(quarry)) = (tuning.chase, quarry) else {
        return Some(fresh_idle(tuning, rng));
    };

    let step = tuning.speed * settings.speed_factor * seconds;
    intruder.position = intruder.position.step_toward(quarry.position, step);
    if intruder.position.distance(quarry.position) > settings.catch_radius {
        return None;
    }

    debug!(
        intruder = intruder.id.get(),
        occupant = quarry.occupant.get(),
        "occupant caught"
    );
    out.push(Event::OccupantCaught {
        occupant: quarry.occupant,
        intruder: intruder.id,
    });
    Some(fresh_idle(tuning, rng))
}
