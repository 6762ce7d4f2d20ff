//! Wallets and liveness of room owners.

use nightmare_dorm_core::{OccupantId, OccupantSnapshot, RoomId};

#[derive(Clone, Debug)]
pub(crate) struct Occupant {
    pub(crate) id: OccupantId,
    pub(crate) name: String,
    pub(crate) gold: f64,
    pub(crate) alive: bool,
    pub(crate) room: Option<RoomId>,
    pub(crate) autonomous: bool,
}

impl Occupant {
    pub(crate) fn new(id: OccupantId, name: String, autonomous: bool, gold: f64) -> Self {
        Self {
            id,
            name,
            gold,
            alive: true,
            room: None,
            autonomous,
        }
    }

    /// Whole gold units available, as reported in funding rejections.
    pub(crate) fn available(&self) -> u64 {
        self.gold.max(0.0).floor() as u64
    }

    pub(crate) fn can_afford(&self, cost: u32) -> bool {
        self.gold >= f64::from(cost)
    }

    pub(crate) fn snapshot(&self) -> OccupantSnapshot {
        OccupantSnapshot {
            id: self.id,
            name: self.name.clone(),
            gold: self.gold,
            alive: self.alive,
            room: self.room,
            autonomous: self.autonomous,
        }
    }
}
