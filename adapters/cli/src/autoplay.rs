use std::time::Duration;

use nightmare_dorm_core::{BuildingKind, Command, MemoryStore, Phase};
use nightmare_dorm_session::Session;
use nightmare_dorm_system_occupants::{Autopilot, AutopilotConfig};
use nightmare_dorm_world::query;
use tracing::{debug, info};

/// Spends the player's gold with the same priorities autonomous occupants use.
#[derive(Debug)]
pub(crate) struct Autoplay {
    pilot: Autopilot,
    period: f32,
    timer: f32,
}

impl Autoplay {
    pub(crate) fn new(config: AutopilotConfig) -> Self {
        Self {
            period: config.decision_period_secs,
            pilot: Autopilot::new(config),
            timer: 0.0,
        }
    }

    /// Accrues `dt` and issues at most one command once a period has passed.
    pub(crate) fn step(&mut self, session: &mut Session<MemoryStore>, dt: Duration) {
        if session.phase() != Phase::Playing {
            return;
        }
        self.timer += dt.as_secs_f32();
        if self.timer < self.period {
            return;
        }
        self.timer = 0.0;

        let occupants = session.occupant_view();
        let rooms = session.room_view();
        let Some(player) = occupants.get(session.human()) else {
            return;
        };
        let Some(room) = session.human_room().and_then(|id| rooms.get(id)) else {
            return;
        };
        let turret_cost = query::tables(session.world())
            .buildings
            .spec(BuildingKind::Turret)
            .cost;

        let outcome = match self.pilot.decide(player, room, turret_cost) {
            Some(Command::UpgradeDoor { .. }) => session.upgrade_door(),
            Some(Command::UpgradeBed { .. }) => session.upgrade_bed(),
            Some(Command::Build { cell, kind, .. }) => session.build_at(cell, kind),
            _ => return,
        };
        match outcome {
            Ok(receipt) => info!(?receipt, "autoplay purchase"),
            Err(rejection) => debug!(%rejection, "autoplay purchase rejected"),
        }
    }
}
