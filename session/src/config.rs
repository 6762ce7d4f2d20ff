//! Session tunables, deserializable from partial TOML overrides.

use nightmare_dorm_system_combat::CombatTuning;
use nightmare_dorm_system_intruders::IntruderTuning;
use nightmare_dorm_system_occupants::AutopilotConfig;
use nightmare_dorm_system_waves::WaveConfig;
use nightmare_dorm_world::WorldConfig;
use serde::{Deserialize, Serialize};

/// Every knob a session is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for the session's random number generator.
    pub seed: u64,
    /// Seconds the human has to pick a room.
    pub selection_secs: f32,
    /// Seconds the human must survive to win.
    pub survival_secs: f32,
    /// Survival seconds per bee coin.
    pub reward_rate_secs: f64,
    /// Gold the human starts with before talent bonuses.
    pub start_gold: u32,
    /// Gold every autonomous occupant starts with.
    pub ai_start_gold: u32,
    /// Display name of the human occupant.
    pub player_name: String,
    /// Names of autonomous occupants, one per occupant.
    pub ai_names: Vec<String>,
    /// Upper bound on autonomous occupants.
    pub max_autonomous: usize,
    /// Floor layout and economy tables.
    pub world: WorldConfig,
    /// Intruder stats and behaviour.
    pub intruders: IntruderTuning,
    /// Projectile tunables.
    pub combat: CombatTuning,
    /// Wave timing and spawn points.
    pub waves: WaveConfig,
    /// Autonomous occupant behaviour.
    pub autopilot: AutopilotConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            selection_secs: 25.0,
            survival_secs: 180.0,
            reward_rate_secs: 10.0,
            start_gold: 10,
            ai_start_gold: 0,
            player_name: String::from("你"),
            ai_names: ["躺平爸爸", "躺平皇帝", "躺平黄金", "躺平王者"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_autonomous: 4,
            world: WorldConfig::default(),
            intruders: IntruderTuning::default(),
            combat: CombatTuning::default(),
            waves: WaveConfig::default(),
            autopilot: AutopilotConfig::default(),
        }
    }
}
