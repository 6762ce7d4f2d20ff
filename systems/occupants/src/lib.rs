#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autopilot for AI-controlled room owners.
//!
//! Every autonomous occupant re-evaluates its room on a fixed period and
//! queues at most one economy command per decision. The system also turns
//! broken doors and caught occupants into elimination commands carrying a
//! broadcast message.

use std::collections::BTreeMap;
use std::time::Duration;

use nightmare_dorm_core::{
    BuildingKind, Command, Event, OccupantId, OccupantSnapshot, OccupantView, RoomSnapshot,
    RoomView,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunables for autonomous occupants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Seconds of accrued time between two decisions.
    pub decision_period_secs: f32,
    /// Door health fraction below which a door upgrade takes priority.
    pub door_alarm: f32,
    /// Suffixes appended to an occupant's name when they are eliminated.
    pub messages: Vec<String>,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            decision_period_secs: 2.0,
            door_alarm: 0.5,
            messages: ["被猛鬼抓走了", "的门被破坏了", "惨遭淘汰", "躺平失败了"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Decision loop shared by every autonomous occupant.
#[derive(Debug)]
pub struct Autopilot {
    config: AutopilotConfig,
    timers: BTreeMap<OccupantId, f32>,
}

impl Autopilot {
    /// Creates an autopilot with every decision timer at zero.
    #[must_use]
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            timers: BTreeMap::new(),
        }
    }

    /// Consumes this tick's events and advances decision timers by `dt`.
    ///
    /// `turret_cost` is the current price of a turret, used by the lowest
    /// priority decision.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<R: Rng>(
        &mut self,
        events: &[Event],
        dt: Duration,
        occupants: &OccupantView,
        rooms: &RoomView,
        turret_cost: u32,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        let mut fallen = Vec::new();
        for event in events {
            let victim = match event {
                Event::RoomBroken { room } => rooms.get(*room).and_then(|snapshot| snapshot.owner),
                Event::OccupantCaught { occupant, .. } => Some(*occupant),
                _ => None,
            };
            let Some(snapshot) = victim.and_then(|id| occupants.get(id)) else {
                continue;
            };
            if !snapshot.alive || fallen.contains(&snapshot.id) {
                continue;
            }
            fallen.push(snapshot.id);
            let message = self.farewell(&snapshot.name, rng);
            out.push(Command::EliminateOccupant {
                occupant: snapshot.id,
                message,
            });
        }

        let seconds = dt.as_secs_f32();
        for occupant in occupants.iter().filter(|entry| entry.autonomous) {
            if !occupant.alive || fallen.contains(&occupant.id) {
                let _ = self.timers.remove(&occupant.id);
                continue;
            }
            let Some(room) = occupant.room.and_then(|id| rooms.get(id)) else {
                continue;
            };
            if room.door.is_broken() {
                continue;
            }

            let timer = self.timers.entry(occupant.id).or_insert(0.0);
            *timer += seconds;
            if *timer < self.config.decision_period_secs {
                continue;
            }
            *timer = 0.0;

            if let Some(command) = self.decide(occupant, room, turret_cost) {
                debug!(occupant = occupant.id.get(), ?command, "autopilot decision");
                out.push(command);
            }
        }
    }

    /// Chooses the single action an occupant takes this decision, if any.
    ///
    /// A damaged door comes first, then the bed, then a turret on the first
    /// free cell. Unaffordable actions are skipped.
    #[must_use]
    pub fn decide(
        &self,
        occupant: &OccupantSnapshot,
        room: &RoomSnapshot,
        turret_cost: u32,
    ) -> Option<Command> {
        let affords = |cost: u32| occupant.gold >= f64::from(cost);

        if room.door.hp_fraction() < self.config.door_alarm
            && room.next_door_cost.is_some_and(affords)
        {
            return Some(Command::UpgradeDoor {
                occupant: occupant.id,
            });
        }

        if room.next_bed_cost.is_some_and(affords) {
            return Some(Command::UpgradeBed {
                occupant: occupant.id,
            });
        }

        match room.free_cell {
            Some(cell) if affords(turret_cost) => Some(Command::Build {
                occupant: occupant.id,
                cell,
                kind: BuildingKind::Turret,
            }),
            _ => None,
        }
    }

    /// Forgets every decision timer.
    pub fn reset(&mut self) {
        self.timers.clear();
    }

    fn farewell<R: Rng>(&self, name: &str, rng: &mut R) -> String {
        if self.config.messages.is_empty() {
            return name.to_owned();
        }
        let index = rng.gen_range(0..self.config.messages.len());
        format!("{name} {}", self.config.messages[index])
    }
}
