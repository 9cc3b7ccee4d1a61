//! Time-driven spawn scheduling
//!
//! - `SpawnRamp`: hazard spawner whose interval shrinks linearly with round time
//! - `IntervalTimer`: fixed-period timer for pickups
//! - `DifficultyLadder`: stepwise speed/interval escalation
//! - `pick_weighted`: cumulative-weight target selection

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters for a linear spawn ramp (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampTuning {
    pub first_delay: f64,
    pub initial_interval: f64,
    pub minimum_interval: f64,
    pub ramp_duration: f64,
}

impl Default for RampTuning {
    fn default() -> Self {
        Self {
            first_delay: 1.0,
            initial_interval: 5.0,
            minimum_interval: 0.5,
            ramp_duration: 90.0,
        }
    }
}

impl RampTuning {
    /// Clamp into a consistent configuration (minimum never above initial)
    pub fn sanitized(&self) -> Self {
        let initial_interval = self.initial_interval.max(0.0);
        Self {
            first_delay: self.first_delay.max(0.0),
            initial_interval,
            minimum_interval: self.minimum_interval.clamp(0.0, initial_interval),
            ramp_duration: self.ramp_duration.max(0.0),
        }
    }
}

/// Hazard spawner: silent until `first_delay`, then one spawn per (shrinking) interval
#[derive(Debug, Clone)]
pub struct SpawnRamp {
    tuning: RampTuning,
    elapsed: f64,
    since_last: f64,
    armed: bool,
}

impl SpawnRamp {
    pub fn new(tuning: &RampTuning) -> Self {
        Self {
            tuning: tuning.sanitized(),
            elapsed: 0.0,
            since_last: 0.0,
            armed: false,
        }
    }

    /// Interval for a given round time, clamped to `[minimum, initial]`
    pub fn interval_at(&self, elapsed: f64) -> f64 {
        let t = &self.tuning;
        let progress = if t.ramp_duration > 0.0 {
            (elapsed.max(0.0) / t.ramp_duration).min(1.0)
        } else {
            1.0
        };
        let interval = t.initial_interval - (t.initial_interval - t.minimum_interval) * progress;
        interval.clamp(t.minimum_interval, t.initial_interval)
    }

    pub fn current_interval(&self) -> f64 {
        self.interval_at(self.elapsed)
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance by `dt`; returns true when a hazard should spawn this tick
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        if !self.armed {
            if self.elapsed >= self.tuning.first_delay {
                self.armed = true;
                self.since_last = 0.0;
            }
            return false;
        }

        self.since_last += dt;
        if self.since_last >= self.current_interval() {
            self.since_last = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.since_last = 0.0;
        self.armed = false;
    }
}

/// Fixed-period timer; fires once per `period` while allowed
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    period: f64,
    accumulated: f64,
}

impl IntervalTimer {
    pub fn new(period: f64) -> Self {
        Self {
            period: period.max(0.0),
            accumulated: 0.0,
        }
    }

    /// Advance; fires (and restarts) when the period has elapsed and `allowed` is true.
    ///
    /// While not allowed the timer keeps counting, so it fires on the first
    /// allowed tick after the period.
    pub fn advance(&mut self, dt: f64, allowed: bool) -> bool {
        self.accumulated += dt;
        if allowed && self.accumulated >= self.period {
            self.accumulated = 0.0;
            true
        } else {
            false
        }
    }

    /// Restart the period (e.g. after a pickup was consumed)
    pub fn restart(&mut self) {
        self.accumulated = 0.0;
    }
}

/// Parameters for stepwise difficulty escalation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderTuning {
    /// Seconds between difficulty steps
    pub step_secs: f64,
    pub initial_speed: f64,
    pub speed_step: f64,
    pub max_speed: f64,
    pub initial_interval: f64,
    pub interval_step: f64,
    pub min_interval: f64,
}

impl Default for LadderTuning {
    fn default() -> Self {
        Self {
            step_secs: 15.0,
            initial_speed: 62.5,
            speed_step: 12.5,
            max_speed: 218.75,
            initial_interval: 1.5,
            interval_step: 0.2,
            min_interval: 0.25,
        }
    }
}

impl LadderTuning {
    pub fn sanitized(&self) -> Self {
        let initial_speed = self.initial_speed.max(0.0);
        let initial_interval = self.initial_interval.max(0.0);
        Self {
            step_secs: self.step_secs.max(f64::EPSILON),
            initial_speed,
            speed_step: self.speed_step.max(0.0),
            max_speed: self.max_speed.max(initial_speed),
            initial_interval,
            interval_step: self.interval_step.max(0.0),
            min_interval: self.min_interval.clamp(0.0, initial_interval),
        }
    }
}

/// Monotone difficulty: speed only goes up, spawn interval only goes down
#[derive(Debug, Clone)]
pub struct DifficultyLadder {
    tuning: LadderTuning,
    elapsed: f64,
    level: u32,
    speed: f64,
    interval: f64,
    since_spawn: f64,
}

impl DifficultyLadder {
    pub fn new(tuning: &LadderTuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            elapsed: 0.0,
            level: 0,
            speed: tuning.initial_speed,
            interval: tuning.initial_interval,
            since_spawn: 0.0,
            tuning,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Advance round time; returns true when a difficulty step happened
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        let target = (self.elapsed / self.tuning.step_secs).floor() as u32;
        let mut stepped = false;
        while self.level < target {
            self.level += 1;
            self.speed = (self.speed + self.tuning.speed_step).min(self.tuning.max_speed);
            self.interval = (self.interval - self.tuning.interval_step).max(self.tuning.min_interval);
            stepped = true;
        }
        if stepped {
            log::info!(
                "Difficulty level {}: speed {:.2}, spawn interval {:.2}s",
                self.level,
                self.speed,
                self.interval
            );
        }
        stepped
    }

    /// Count spawn time against the current interval; true when a hazard is due
    pub fn spawn_due(&mut self, dt: f64) -> bool {
        self.since_spawn += dt;
        if self.since_spawn >= self.interval {
            self.since_spawn = 0.0;
            true
        } else {
            false
        }
    }
}

/// Cumulative-weight draw over `(point, weight)` candidates.
///
/// Non-positive weights never win. Returns `None` when nothing can be drawn.
pub fn pick_weighted<R: Rng + ?Sized>(rng: &mut R, candidates: &[(DVec2, f64)]) -> Option<DVec2> {
    let total: f64 = candidates.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.random::<f64>() * total;
    let mut last = None;
    for &(point, weight) in candidates {
        if weight <= 0.0 {
            continue;
        }
        if roll < weight {
            return Some(point);
        }
        roll -= weight;
        last = Some(point);
    }
    // Float round-off at the top end
    last
}
