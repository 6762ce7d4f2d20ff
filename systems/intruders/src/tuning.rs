//! Tunable intruder parameters.

use nightmare_dorm_core::{OccupantId, WorldPoint, WorldRect};
use serde::{Deserialize, Serialize};

/// Stats and behavioural constants shared by every intruder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntruderTuning {
    /// Hit points before wave scaling.
    pub base_hp: f32,
    /// Damage per strike before wave scaling.
    pub base_damage: u32,
    /// Stat growth per wave index.
    pub difficulty: f64,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Seconds between door strikes.
    pub attack_interval: f32,
    /// Hit point fraction under which an attacker retreats.
    pub retreat_threshold: f32,
    /// Hit points regained per second near the spawn point.
    pub heal_rate: f32,
    /// Hit point fraction at which a retreating intruder resumes idling.
    pub recovery_fraction: f32,
    /// Distance from the door, along its facing, where attackers stand.
    pub stand_off: f32,
    /// Distance to the stand-off point within which strikes land.
    pub attack_range: f32,
    /// Shortest idle dwell before target selection, in seconds.
    pub dwell_min: f32,
    /// Longest idle dwell before target selection, in seconds.
    pub dwell_max: f32,
    /// Speed multiplier while wandering.
    pub wander_factor: f32,
    /// Speed multiplier while retreating.
    pub retreat_factor: f32,
    /// Distance at which a wander point counts as reached.
    pub arrival_radius: f32,
    /// Distance from the spawn point within which healing happens.
    pub home_radius: f32,
    /// Area wander points are drawn from.
    pub wander_area: WorldRect,
    /// Offset from the spawn point of the first wander point.
    pub first_wander: WorldPoint,
    /// Enables pursuit of exposed occupants when present.
    pub chase: Option<ChaseTuning>,
}

impl Default for IntruderTuning {
    fn default() -> Self {
        Self {
            base_hp: 50.0,
            base_damage: 10,
            difficulty: 0.1,
            speed: 40.0,
            attack_interval: 1.5,
            retreat_threshold: 0.2,
            heal_rate: 20.0,
            recovery_fraction: 0.8,
            stand_off: 30.0,
            attack_range: 40.0,
            dwell_min: 3.0,
            dwell_max: 5.0,
            wander_factor: 0.5,
            retreat_factor: 1.5,
            arrival_radius: 10.0,
            home_radius: 20.0,
            wander_area: WorldRect::new(150.0, 200.0, 150.0, 300.0),
            first_wander: WorldPoint::new(0.0, 100.0),
            chase: None,
        }
    }
}

/// Parameters of the optional chase capability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseTuning {
    /// Distance within which an idle intruder notices an exposed occupant.
    pub detection_range: f32,
    /// Speed multiplier while chasing.
    pub speed_factor: f32,
    /// Distance at which the occupant is caught.
    pub catch_radius: f32,
}

impl Default for ChaseTuning {
    fn default() -> Self {
        Self {
            detection_range: 400.0,
            speed_factor: 1.5,
            catch_radius: 30.0,
        }
    }
}

/// Occupant position offered to chase-capable intruders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quarry {
    /// Occupant being tracked.
    pub occupant: OccupantId,
    /// Current position of the occupant.
    pub position: WorldPoint,
    /// Whether the occupant is outside the protection of a door.
    pub exposed: bool,
}
