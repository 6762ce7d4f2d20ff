#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave schedule that decides when and where intruders enter the floor.
//!
//! Nothing spawns until the pre-combat delay has elapsed. The first wave
//! arrives the moment the delay is crossed and later waves follow on a
//! fixed interval.

use std::time::Duration;

use nightmare_dorm_core::{Event, WorldPoint};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tunables for the wave schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Survival seconds before intruders become active.
    pub delay_secs: f32,
    /// Seconds between two waves once active.
    pub interval_secs: f32,
    /// Every wave whose number is a multiple of this spawns one extra intruder.
    pub extra_every: u32,
    /// Candidate spawn locations, picked uniformly per intruder.
    pub spawn_points: Vec<WorldPoint>,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            delay_secs: 30.0,
            interval_secs: 15.0,
            extra_every: 3,
            spawn_points: vec![
                WorldPoint::new(225.0, -50.0),
                WorldPoint::new(50.0, 375.0),
                WorldPoint::new(400.0, 375.0),
            ],
        }
    }
}

/// Request to place one intruder of the given wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnOrder {
    /// Wave the intruder belongs to, driving its stat scaling.
    pub wave: u32,
    /// Where the intruder appears.
    pub position: WorldPoint,
}

/// Stateful wave clock.
#[derive(Debug)]
pub struct WaveSchedule {
    config: WaveConfig,
    elapsed: Duration,
    active: bool,
    accumulator: f32,
    wave: u32,
}

impl WaveSchedule {
    /// Creates an inactive schedule at time zero.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self {
            config,
            elapsed: Duration::ZERO,
            active: false,
            accumulator: 0.0,
            wave: 0,
        }
    }

    /// Consumes time advanced this tick and emits spawn orders.
    pub fn handle<R: Rng>(
        &mut self,
        events: &[Event],
        rng: &mut R,
        orders: &mut Vec<SpawnOrder>,
        out: &mut Vec<Event>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }
        if accumulated.is_zero() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(accumulated);
        let elapsed = self.elapsed.as_secs_f32();

        if !self.active {
            if elapsed < self.config.delay_secs {
                return;
            }
            self.active = true;
            self.accumulator = elapsed - self.config.delay_secs;
            info!(elapsed, "intruders awakened");
            out.push(Event::IntrudersAwakened);
            self.launch(1, rng, orders, out);
        } else {
            self.accumulator += accumulated.as_secs_f32();
        }

        if self.config.interval_secs <= 0.0 {
            return;
        }
        while self.accumulator >= self.config.interval_secs {
            self.accumulator -= self.config.interval_secs;
            let next = self.wave.saturating_add(1);
            self.launch(next, rng, orders, out);
        }
    }

    fn launch<R: Rng>(
        &mut self,
        wave: u32,
        rng: &mut R,
        orders: &mut Vec<SpawnOrder>,
        out: &mut Vec<Event>,
    ) {
        self.wave = wave;
        let extra = self.config.extra_every != 0 && wave % self.config.extra_every == 0;
        let intruders = 1 + u32::from(extra);
        debug!(wave, intruders, "wave started");
        out.push(Event::WaveStarted { wave, intruders });

        if self.config.spawn_points.is_empty() {
            return;
        }
        for _ in 0..intruders {
            let index = rng.gen_range(0..self.config.spawn_points.len());
            orders.push(SpawnOrder {
                wave,
                position: self.config.spawn_points[index],
            });
        }
    }

    /// Whether the pre-combat delay has been crossed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Number of the most recent wave, zero before activation.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Seconds left before intruders awaken, zero once active.
    #[must_use]
    pub fn seconds_until_active(&self) -> f32 {
        if self.active {
            return 0.0;
        }
        (self.config.delay_secs - self.elapsed.as_secs_f32()).max(0.0)
    }

    /// Returns the schedule to its inactive starting state.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.active = false;
        self.accumulator = 0.0;
        self.wave = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn advance(schedule: &mut WaveSchedule, millis: u64) -> (Vec<SpawnOrder>, Vec<Event>) {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut orders = Vec::new();
        let mut events = Vec::new();
        schedule.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(millis),
            }],
            &mut rng,
            &mut orders,
            &mut events,
        );
        (orders, events)
    }

    #[test]
    fn third_wave_spawns_an_extra_intruder() {
        let mut schedule = WaveSchedule::new(WaveConfig::default());
        let (first, _) = advance(&mut schedule, 30_000);
        assert_eq!(first.len(), 1);

        let (second, _) = advance(&mut schedule, 15_000);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].wave, 2);

        let (third, events) = advance(&mut schedule, 15_000);
        assert_eq!(third.len(), 2);
        assert!(third.iter().all(|order| order.wave == 3));
        assert_eq!(
            events,
            vec![Event::WaveStarted {
                wave: 3,
                intruders: 2
            }]
        );
    }

    #[test]
    fn reset_returns_to_inactive() {
        let mut schedule = WaveSchedule::new(WaveConfig::default());
        let _ = advance(&mut schedule, 31_000);
        assert!(schedule.is_active());

        schedule.reset();
        assert!(!schedule.is_active());
        assert_eq!(schedule.wave(), 0);
        assert_eq!(schedule.seconds_until_active(), 30.0);
    }
}
