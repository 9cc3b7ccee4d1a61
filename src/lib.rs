//! Roid Rush - simulation core for two arcade games
//!
//! Core modules:
//! - `sim`: Shared engine (entities, spatial grid, collision, spawning, particles, phases)
//! - `asteroids`: Asteroids survival shooter rules
//! - `defense`: Missile-defense rules
//! - `game_loop`: Fixed timestep driver
//! - `render`: Read-only render contract
//! - `persistence`: High score storage
//! - `tuning`: Data-driven game balance
//! - `platform`: Game selection and input mapping; browser driver on wasm32

pub mod asteroids;
pub mod defense;
pub mod error;
pub mod game_loop;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{PersistError, TuningError};
pub use game_loop::{FixedTimestep, FrameOutcome, GameLoop, Simulation};
pub use highscores::HighScore;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::DVec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Fixed timestep as an exact duration for the accumulator
    pub const SIM_TICK: Duration = Duration::from_nanos(16_666_666);
    /// Largest frame delta fed to the accumulator (spiral of death guard)
    pub const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

    /// Broad phase cell size (world units)
    pub const GRID_CELL_SIZE: f64 = 100.0;

    /// Asteroids playfield
    pub const ASTEROIDS_WIDTH: f64 = 1280.0;
    pub const ASTEROIDS_HEIGHT: f64 = 720.0;

    /// Defense playfield
    pub const DEFENSE_WIDTH: f64 = 960.0;
    pub const DEFENSE_HEIGHT: f64 = 720.0;
    pub const GROUND_LEVEL: f64 = 700.0;

    /// Minimum time spent in the exploding phase before game over
    pub const MIN_EXPLODING_SECS: f64 = 1.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for an angle (radians)
#[inline]
pub fn from_angle(theta: f64) -> DVec2 {
    DVec2::new(theta.cos(), theta.sin())
}

/// Uniform sample in [min, max); returns `min` for an empty range
#[inline]
pub fn random_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Random point on one of the four edges of a `width` x `height` rectangle
pub fn random_edge_position<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> DVec2 {
    match rng.random_range(0..4u8) {
        0 => DVec2::new(random_range(rng, 0.0, width), 0.0),
        1 => DVec2::new(width, random_range(rng, 0.0, height)),
        2 => DVec2::new(random_range(rng, 0.0, width), height),
        _ => DVec2::new(0.0, random_range(rng, 0.0, height)),
    }
}

/// Direction from `from` to `to`, or `fallback` when the points coincide
#[inline]
pub fn direction_or(from: DVec2, to: DVec2, fallback: DVec2) -> DVec2 {
    let delta = to - from;
    let len = delta.length();
    if len > f64::EPSILON {
        delta / len
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-9);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-9);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_edge_position_on_border() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let p = random_edge_position(&mut rng, 800.0, 600.0);
            let on_edge = p.x == 0.0 || p.x == 800.0 || p.y == 0.0 || p.y == 600.0;
            assert!(on_edge, "{p:?} is not on an edge");
        }
    }

    #[test]
    fn test_random_range_degenerate() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(random_range(&mut rng, 5.0, 5.0), 5.0);
        let v = random_range(&mut rng, -1.0, 1.0);
        assert!((-1.0..1.0).contains(&v));
    }

    #[test]
    fn test_direction_or_zero_length() {
        let p = DVec2::new(3.0, 4.0);
        assert_eq!(direction_or(p, p, DVec2::Y), DVec2::Y);
        let d = direction_or(DVec2::ZERO, DVec2::new(0.0, 10.0), DVec2::X);
        assert!((d - DVec2::Y).length() < 1e-12);
    }
}
