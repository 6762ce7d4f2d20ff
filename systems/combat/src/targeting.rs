//! Nearest-intruder selection for turrets.

use nightmare_dorm_core::{IntruderId, IntruderView, TurretSnapshot, WorldPoint};

/// Intruder chosen by a turret along with where it stood when chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lock {
    /// Intruder to fire at.
    pub intruder: IntruderId,
    /// Position of the intruder at selection time.
    pub position: WorldPoint,
    /// Squared distance from the turret.
    pub distance_sq: f32,
}

impl Lock {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.intruder < other.intruder
    }
}

/// Picks the live intruder closest to the turret within its range.
///
/// Intruders exactly at range are eligible. Equal distances resolve to the
/// lower identifier.
#[must_use]
pub fn nearest_in_range(turret: &TurretSnapshot, intruders: &IntruderView) -> Option<Lock> {
    let range_sq = turret.range * turret.range;
    let mut best: Option<Lock> = None;

    for snapshot in intruders.iter() {
        if snapshot.hp <= 0.0 {
            continue;
        }

        let distance_sq = turret.position.distance_squared(snapshot.position);
        if distance_sq > range_sq {
            continue;
        }

        let current = Lock {
            intruder: snapshot.id,
            position: snapshot.position,
            distance_sq,
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best
}
