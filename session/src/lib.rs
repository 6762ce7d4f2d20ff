#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestrator for Nightmare Dorm.
//!
//! A [`Session`] owns the world, every system and the random number
//! generator. [`Session::tick`] is the only way simulated time moves and it
//! resolves each tick in a fixed order: economy, waves and intruders,
//! combat, autonomous occupants, then the phase check. Commands issued by
//! the human are applied immediately between ticks.

mod config;

use std::time::Duration;

use nightmare_dorm_core::{
    BuildingKind, CellIndex, Command, DoorSnapshot, Event, GameRecord, IntruderView, InvalidTarget,
    OccupantId, OccupantView, Phase, ProgressStore, ProjectileSnapshot, Receipt, Rejection, RoomId,
    RoomView,
};
use nightmare_dorm_system_combat::Combat;
use nightmare_dorm_system_intruders::Horde;
use nightmare_dorm_system_occupants::Autopilot;
use nightmare_dorm_system_waves::WaveSchedule;
use nightmare_dorm_world::{apply, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

pub use config::SessionConfig;

/// Converts a configured number of seconds into a duration.
///
/// Negative or non-finite values collapse to zero.
fn span(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::ZERO)
}

/// Bee coins granted for a finished session.
///
/// One coin per full `rate_secs` survived plus one per kill. A non-positive
/// rate grants kills only.
#[must_use]
pub fn bee_reward(survival_secs: f64, rate_secs: f64, kills: u32) -> u64 {
    let survived = if rate_secs > 0.0 && survival_secs > 0.0 {
        (survival_secs / rate_secs).floor() as u64
    } else {
        0
    };
    survived.saturating_add(u64::from(kills))
}

/// One game from room selection to victory or defeat.
#[derive(Debug)]
pub struct Session<S> {
    config: SessionConfig,
    store: S,
    rng: ChaCha8Rng,
    world: World,
    horde: Horde,
    combat: Combat,
    waves: WaveSchedule,
    autopilot: Autopilot,
    phase: Phase,
    selecting: Duration,
    survival: Duration,
    kills: u32,
    human: OccupantId,
    bee_reward: Option<u64>,
    pending: Vec<Event>,
}

impl<S: ProgressStore> Session<S> {
    /// Creates a session in the selecting phase.
    ///
    /// Talent bonuses are read from `store` once here and again on every
    /// restart. Autonomous occupants are housed immediately.
    #[must_use]
    pub fn new(config: SessionConfig, store: S) -> Self {
        let mut session = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            world: World::with_config(config.world.clone(), store.door_hp_bonus()),
            horde: Horde::new(config.intruders.clone()),
            combat: Combat::new(config.combat),
            waves: WaveSchedule::new(config.waves.clone()),
            autopilot: Autopilot::new(config.autopilot.clone()),
            phase: Phase::Selecting,
            selecting: Duration::ZERO,
            survival: Duration::ZERO,
            kills: 0,
            human: OccupantId::new(0),
            bee_reward: None,
            pending: Vec::new(),
            config,
            store,
        };
        session.populate();
        session
    }

    fn populate(&mut self) {
        let gold = self
            .config
            .start_gold
            .saturating_add(self.store.start_gold_bonus());
        self.human = self
            .world
            .enrol(self.config.player_name.clone(), false, f64::from(gold));

        let mut free: Vec<RoomId> = query::room_view(&self.world)
            .iter()
            .map(|room| room.id)
            .collect();
        let ai_gold = f64::from(self.config.ai_start_gold);
        for name in self.config.ai_names.iter().take(self.config.max_autonomous) {
            if free.len() <= 1 {
                break;
            }
            let occupant = self.world.enrol(name.clone(), true, ai_gold);
            let room = free.remove(self.rng.gen_range(0..free.len()));
            if let Err(rejection) = self.world.claim_room(occupant, room) {
                warn!(occupant = occupant.get(), room = room.get(), %rejection, "autonomous occupant left homeless");
            }
        }
    }

    /// Returns the session to room selection with a fresh floor.
    ///
    /// Talent bonuses are re-read so purchases made between games apply.
    pub fn restart(&mut self) {
        self.world = World::with_config(self.config.world.clone(), self.store.door_hp_bonus());
        self.horde.clear();
        self.combat.clear();
        self.waves.reset();
        self.autopilot.reset();
        self.phase = Phase::Selecting;
        self.selecting = Duration::ZERO;
        self.survival = Duration::ZERO;
        self.kills = 0;
        self.bee_reward = None;
        self.pending.clear();
        self.populate();
        info!("session restarted");
    }

    /// Advances the session by `dt` and returns everything that happened.
    ///
    /// Events raised by commands since the previous tick are returned first.
    /// Ticks after the session ended do nothing.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = std::mem::take(&mut self.pending);
        match self.phase {
            Phase::Selecting => self.tick_selecting(dt, &mut events),
            Phase::Playing => self.tick_playing(dt, &mut events),
            Phase::Victory | Phase::GameOver => {}
        }
        events
    }

    fn tick_selecting(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.selecting = self.selecting.saturating_add(dt);
        if self.selecting < span(self.config.selection_secs) {
            return;
        }

        let free: Vec<RoomId> = query::room_view(&self.world)
            .iter()
            .filter(|room| room.owner.is_none())
            .map(|room| room.id)
            .collect();
        if free.is_empty() {
            warn!("no room left for the player");
            self.finish(Phase::GameOver, out);
            return;
        }

        let room = free[self.rng.gen_range(0..free.len())];
        match self.world.claim_room(self.human, room) {
            Ok(receipt) => {
                info!(room = room.get(), "room assigned after selection timeout");
                out.push(receipt.into_event(self.human));
                self.begin_playing(out);
            }
            Err(rejection) => {
                warn!(%rejection, "automatic room assignment failed");
                self.finish(Phase::GameOver, out);
            }
        }
    }

    fn begin_playing(&mut self, out: &mut Vec<Event>) {
        apply(&mut self.world, Command::BeginResting, out);
        self.survival = Duration::ZERO;
        self.transition(Phase::Playing, out);
    }

    fn tick_playing(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.survival = self.survival.saturating_add(dt);
        let mark = out.len();

        let mut economy = Vec::new();
        apply(&mut self.world, Command::Tick { dt }, &mut economy);
        out.extend_from_slice(&economy);

        let mut orders = Vec::new();
        self.waves.handle(&economy, &mut self.rng, &mut orders, out);
        for order in orders {
            let _ = self
                .horde
                .spawn(order.wave, order.position, &mut self.rng, out);
        }

        let rooms = query::room_view(&self.world);
        let world = &mut self.world;
        self.horde.handle(
            dt,
            &rooms,
            &[],
            &mut self.rng,
            |room, damage| world.take_door_damage(room, damage),
            out,
        );

        self.resolve_combat(dt, &rooms, out);
        self.run_autopilot(dt, mark, out);
        self.check_outcome(out);
    }

    fn resolve_combat(&mut self, dt: Duration, rooms: &RoomView, out: &mut Vec<Event>) {
        let turrets = query::turret_view(&self.world);
        let intruders = self.horde.view();
        let horde = &mut self.horde;
        let mut commands = Vec::new();
        let mark = out.len();
        self.combat.handle(
            dt,
            self.waves.wave(),
            &turrets,
            &intruders,
            |intruder, damage| horde.strike(intruder, damage),
            &mut commands,
            out,
        );

        let home = query::room_of(&self.world, self.human);
        for event in &out[mark..] {
            let Event::IntruderKilled { room, reward, .. } = event else {
                continue;
            };
            if home == Some(*room) {
                self.kills = self.kills.saturating_add(1);
            }
            if let Some(owner) = rooms.get(*room).and_then(|snapshot| snapshot.owner) {
                commands.push(Command::Reward {
                    occupant: owner,
                    amount: f64::from(*reward),
                });
            }
        }

        for command in commands {
            apply(&mut self.world, command, out);
        }
        let _ = self.horde.prune();
    }

    fn run_autopilot(&mut self, dt: Duration, mark: usize, out: &mut Vec<Event>) {
        let occupants = query::occupant_view(&self.world);
        let rooms = query::room_view(&self.world);
        let turret_cost = query::tables(&self.world)
            .buildings
            .spec(BuildingKind::Turret)
            .cost;

        let mut commands = Vec::new();
        self.autopilot.handle(
            &out[mark..],
            dt,
            &occupants,
            &rooms,
            turret_cost,
            &mut self.rng,
            &mut commands,
        );
        for command in commands {
            apply(&mut self.world, command, out);
        }
    }

    fn check_outcome(&mut self, out: &mut Vec<Event>) {
        let fallen = query::occupant_view(&self.world)
            .get(self.human)
            .map_or(true, |occupant| !occupant.alive);
        let breached = query::room_of(&self.world, self.human)
            .and_then(|room| query::door(&self.world, room))
            .map_or(true, |door| door.is_broken());

        if fallen || breached {
            self.finish(Phase::GameOver, out);
        } else if self.survival >= span(self.config.survival_secs) {
            self.finish(Phase::Victory, out);
        }
    }

    fn finish(&mut self, outcome: Phase, out: &mut Vec<Event>) {
        let survival_secs = self.survival.as_secs_f64();
        let reward = bee_reward(survival_secs, self.config.reward_rate_secs, self.kills);
        self.bee_reward = Some(reward);
        self.store.record_game(&GameRecord {
            survival_secs,
            kills: self.kills,
            bee_reward: reward,
            victory: outcome == Phase::Victory,
        });
        info!(
            ?outcome,
            survival_secs,
            kills = self.kills,
            bee_reward = reward,
            "session finished"
        );
        self.transition(outcome, out);
    }

    fn transition(&mut self, to: Phase, out: &mut Vec<Event>) {
        let from = self.phase;
        self.phase = to;
        info!(?from, ?to, "phase changed");
        out.push(Event::PhaseChanged { from, to });
    }

    /// Claims a room for the human and starts play.
    pub fn select_room(&mut self, room: RoomId) -> Result<Receipt, Rejection> {
        if self.phase != Phase::Selecting {
            return Err(InvalidTarget::NotSelecting.into());
        }
        let receipt = self.world.claim_room(self.human, room)?;
        self.pending.push(receipt.into_event(self.human));
        let mut events = Vec::new();
        self.begin_playing(&mut events);
        self.pending.append(&mut events);
        Ok(receipt)
    }

    /// Raises the human's bed by one tier.
    pub fn upgrade_bed(&mut self) -> Result<Receipt, Rejection> {
        self.ensure_playing()?;
        let receipt = self.world.upgrade_bed(self.human)?;
        Ok(self.record(receipt))
    }

    /// Raises the human's door by one tier, restoring it to full health.
    pub fn upgrade_door(&mut self) -> Result<Receipt, Rejection> {
        self.ensure_playing()?;
        let receipt = self.world.upgrade_door(self.human)?;
        Ok(self.record(receipt))
    }

    /// Places a building in the human's room.
    pub fn build_at(&mut self, cell: CellIndex, kind: BuildingKind) -> Result<Receipt, Rejection> {
        self.ensure_playing()?;
        let receipt = self.world.build_at(self.human, cell, kind)?;
        Ok(self.record(receipt))
    }

    fn ensure_playing(&self) -> Result<(), Rejection> {
        if self.phase == Phase::Playing {
            Ok(())
        } else {
            Err(InvalidTarget::NotPlaying.into())
        }
    }

    fn record(&mut self, receipt: Receipt) -> Receipt {
        self.pending.push(receipt.into_event(self.human));
        receipt
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds left on the selection countdown or the survival timer.
    #[must_use]
    pub fn remaining_secs(&self) -> f32 {
        let left = match self.phase {
            Phase::Selecting => span(self.config.selection_secs).saturating_sub(self.selecting),
            Phase::Playing => span(self.config.survival_secs).saturating_sub(self.survival),
            Phase::Victory | Phase::GameOver => Duration::ZERO,
        };
        left.as_secs_f32()
    }

    /// Seconds survived since play started.
    #[must_use]
    pub fn survival_secs(&self) -> f64 {
        self.survival.as_secs_f64()
    }

    /// Number of the latest wave, zero before intruders awaken.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.waves.wave()
    }

    /// Whether intruders have awakened.
    #[must_use]
    pub const fn intruders_active(&self) -> bool {
        self.waves.is_active()
    }

    /// Seconds until intruders awaken, zero once they have.
    #[must_use]
    pub fn seconds_until_intruders(&self) -> f32 {
        self.waves.seconds_until_active()
    }

    /// Intruders killed by the human's turrets.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Bee coins granted, available once the session has ended.
    #[must_use]
    pub const fn bee_reward(&self) -> Option<u64> {
        self.bee_reward
    }

    /// Identifier of the human occupant.
    #[must_use]
    pub const fn human(&self) -> OccupantId {
        self.human
    }

    /// Gold held by the human.
    #[must_use]
    pub fn gold(&self) -> f64 {
        query::gold(&self.world, self.human).unwrap_or_default()
    }

    /// Room owned by the human, if one was claimed.
    #[must_use]
    pub fn human_room(&self) -> Option<RoomId> {
        query::room_of(&self.world, self.human)
    }

    /// Door state of a room.
    #[must_use]
    pub fn door(&self, room: RoomId) -> Option<DoorSnapshot> {
        query::door(&self.world, room)
    }

    /// Turret damage per second of a room.
    #[must_use]
    pub fn dps(&self, room: RoomId) -> Option<f32> {
        query::dps(&self.world, room)
    }

    /// Income of a room in gold per second.
    #[must_use]
    pub fn gold_per_second(&self, room: RoomId) -> Option<f64> {
        query::gold_per_second(&self.world, room)
    }

    /// Snapshot of every room.
    #[must_use]
    pub fn room_view(&self) -> RoomView {
        query::room_view(&self.world)
    }

    /// Snapshot of every occupant.
    #[must_use]
    pub fn occupant_view(&self) -> OccupantView {
        query::occupant_view(&self.world)
    }

    /// Snapshot of every living intruder.
    #[must_use]
    pub fn intruder_view(&self) -> IntruderView {
        self.horde.view()
    }

    /// Snapshot of every projectile in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        self.combat.projectiles()
    }

    /// Read-only access to the world for finer queries.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the session was built from.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Persistence collaborator.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the persistence collaborator, e.g. to buy talents
    /// between games.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the session and hands back the persistence collaborator.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
