//! Persistence collaborator contract and an in-memory implementation.

use serde::{Deserialize, Serialize};

use crate::Rejection;

/// Summary of a finished session handed to the persistence collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Seconds survived in the playing phase.
    pub survival_secs: f64,
    /// Intruders killed by turrets during the session.
    pub kills: u32,
    /// Bee coins granted for the session.
    pub bee_reward: u64,
    /// Whether the session ended in victory.
    pub victory: bool,
}

/// Collaborator that supplies talent bonuses and receives finished games.
///
/// Sessions take the store by value at construction and hand it back through
/// `into_store`, so no global save state is involved.
pub trait ProgressStore {
    /// Gold added to the human occupant's starting balance.
    fn start_gold_bonus(&self) -> u32;

    /// Hit points added to every door tier's maximum.
    fn door_hp_bonus(&self) -> u32;

    /// Records a finished session. Called exactly once per session end.
    fn record_game(&mut self, record: &GameRecord);
}

/// Permanent upgrades bought with bee coins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Talent {
    /// Raises the starting gold of every session.
    StartGold,
    /// Raises the maximum hit points of every door tier.
    DoorHp,
}

/// Purchased talent levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Talents {
    /// Level of the [`Talent::StartGold`] talent.
    pub start_gold: u32,
    /// Level of the [`Talent::DoorHp`] talent.
    pub door_hp: u32,
}

impl Talents {
    /// Starting gold granted by the current level.
    #[must_use]
    pub const fn start_gold_bonus(&self) -> u32 {
        self.start_gold.saturating_mul(5)
    }

    /// Door hit points granted by the current level.
    #[must_use]
    pub const fn door_hp_bonus(&self) -> u32 {
        self.door_hp.saturating_mul(20)
    }

    /// Level currently held for the talent.
    #[must_use]
    pub const fn level(&self, talent: Talent) -> u32 {
        match talent {
            Talent::StartGold => self.start_gold,
            Talent::DoorHp => self.door_hp,
        }
    }

    /// Bee coins required to buy the next level of the talent.
    #[must_use]
    pub const fn upgrade_cost(&self, talent: Talent) -> u64 {
        match talent {
            Talent::StartGold => 10 + self.start_gold as u64 * 5,
            Talent::DoorHp => 15 + self.door_hp as u64 * 8,
        }
    }

    fn raise(&mut self, talent: Talent) {
        match talent {
            Talent::StartGold => self.start_gold = self.start_gold.saturating_add(1),
            Talent::DoorHp => self.door_hp = self.door_hp.saturating_add(1),
        }
    }
}

/// Lifetime statistics across every recorded session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerStats {
    /// Number of sessions recorded.
    pub total_games: u32,
    /// Sum of kills across sessions.
    pub total_kills: u64,
    /// Longest survival observed, in seconds.
    pub best_survival_secs: f64,
}

/// [`ProgressStore`] kept entirely in memory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    bee_coins: u64,
    talents: Talents,
    stats: CareerStats,
}

impl MemoryStore {
    /// Creates a store with the provided balance and talents.
    #[must_use]
    pub fn new(bee_coins: u64, talents: Talents) -> Self {
        Self {
            bee_coins,
            talents,
            stats: CareerStats::default(),
        }
    }

    /// Bee coins available for talent purchases.
    #[must_use]
    pub const fn bee_coins(&self) -> u64 {
        self.bee_coins
    }

    /// Purchased talent levels.
    #[must_use]
    pub const fn talents(&self) -> Talents {
        self.talents
    }

    /// Lifetime statistics.
    #[must_use]
    pub const fn stats(&self) -> CareerStats {
        self.stats
    }

    /// Buys one level of the talent, returning the new level.
    pub fn upgrade_talent(&mut self, talent: Talent) -> Result<u32, Rejection> {
        let cost = self.talents.upgrade_cost(talent);
        if self.bee_coins < cost {
            return Err(Rejection::InsufficientFunds {
                needed: cost,
                available: self.bee_coins,
            });
        }

        self.bee_coins -= cost;
        self.talents.raise(talent);
        Ok(self.talents.level(talent))
    }
}

impl ProgressStore for MemoryStore {
    fn start_gold_bonus(&self) -> u32 {
        self.talents.start_gold_bonus()
    }

    fn door_hp_bonus(&self) -> u32 {
        self.talents.door_hp_bonus()
    }

    fn record_game(&mut self, record: &GameRecord) {
        self.bee_coins = self.bee_coins.saturating_add(record.bee_reward);
        self.stats.total_games += 1;
        self.stats.total_kills += u64::from(record.kills);
        if record.survival_secs > self.stats.best_survival_secs {
            self.stats.best_survival_secs = record.survival_secs;
        }
    }
}
