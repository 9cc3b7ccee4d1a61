//! Runtime game balance
//!
//! [`Tuning`] mirrors the balance constants of both games. It deserializes from
//! JSON with every field defaulted, so a file can override just the values it
//! cares about. Values are clamped where used; nothing here is rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;
use crate::sim::{CollisionTuning, LadderTuning, RampTuning};

/// Balance for both games
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub asteroids: AsteroidsTuning,
    pub defense: DefenseTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Asteroids survival balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidsTuning {
    // ── Playfield ───────────────────────────────────────────────────────────
    pub width: f64,
    pub height: f64,
    pub grid_cell_size: f64,

    // ── Hero ────────────────────────────────────────────────────────────────
    pub hero_radius: f64,
    /// Velocity added per tick while thrusting
    pub thrust_per_tick: f64,
    pub reverse_per_tick: f64,
    pub max_hero_speed: f64,
    /// Radians per second
    pub rotation_speed: f64,
    pub invincibility_secs: f64,
    pub max_weapon_level: u8,

    // ── Bullets ─────────────────────────────────────────────────────────────
    pub bullet_speed: f64,
    pub bullet_lifetime: f64,

    // ── Rocks ───────────────────────────────────────────────────────────────
    pub spawn: RampTuning,
    pub rock_speed: f64,
    /// Rocks aim at the centre plus up to ± this many pixels
    pub rock_aim_spread: f64,
    pub rock_aim_jitter_degrees: f64,
    pub collision: CollisionTuning,

    // ── Pickups ─────────────────────────────────────────────────────────────
    pub shield_interval: f64,
    pub shield_radius: f64,
    pub weapon_interval: f64,
    pub weapon_pickup_radius: f64,

    // ── Background field ────────────────────────────────────────────────────
    pub backdrop_rocks: usize,
    pub backdrop_collision: CollisionTuning,
}

impl Default for AsteroidsTuning {
    fn default() -> Self {
        Self {
            width: ASTEROIDS_WIDTH,
            height: ASTEROIDS_HEIGHT,
            grid_cell_size: GRID_CELL_SIZE,
            hero_radius: 22.0,
            thrust_per_tick: 200.0 * 0.25,
            reverse_per_tick: 150.0 * 0.25,
            max_hero_speed: 300.0,
            rotation_speed: 2.0,
            invincibility_secs: 1.0,
            max_weapon_level: 6,
            bullet_speed: 725.0,
            bullet_lifetime: 2.0,
            spawn: RampTuning::default(),
            rock_speed: 100.0,
            rock_aim_spread: 200.0,
            rock_aim_jitter_degrees: 15.0,
            collision: CollisionTuning::default(),
            shield_interval: 10.0,
            shield_radius: 23.0,
            weapon_interval: 15.0,
            weapon_pickup_radius: 15.0,
            backdrop_rocks: 10,
            backdrop_collision: CollisionTuning::drifting(),
        }
    }
}

/// Growing-then-shrinking blast parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlastTuning {
    pub min_radius: f64,
    pub max_radius: f64,
    pub expand_secs: f64,
    pub duration_secs: f64,
}

impl Default for BlastTuning {
    fn default() -> Self {
        Self {
            min_radius: 10.0,
            max_radius: 50.0,
            expand_secs: 0.25,
            duration_secs: 0.5,
        }
    }
}

/// Missile defense balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseTuning {
    // ── Playfield ───────────────────────────────────────────────────────────
    pub width: f64,
    pub height: f64,
    pub ground_level: f64,
    pub grid_cell_size: f64,

    // ── Structures ──────────────────────────────────────────────────────────
    pub launcher_width: f64,
    pub launcher_height: f64,
    pub launcher_cooldown: f64,
    pub base_width: f64,
    pub base_height: f64,
    pub base_hp: u8,
    pub structure_spacing: f64,
    /// Targeting weight of a live launcher
    pub launcher_weight: f64,
    /// Targeting weight of a live base
    pub base_weight: f64,

    // ── Missiles & blasts ───────────────────────────────────────────────────
    pub missile_speed: f64,
    pub blast: BlastTuning,
    /// Points for the first kill of a blast; the n-th kill is worth n times this
    pub blast_points: u64,

    // ── Meteors ─────────────────────────────────────────────────────────────
    pub meteor_radius: f64,
    pub difficulty: LadderTuning,
    pub rect_tolerance: f64,

    // ── Pickups & effects ───────────────────────────────────────────────────
    pub pickup_interval: f64,
    pub pickup_speed: f64,
    pub pickup_radius: f64,
    pub pickup_min_y: f64,
    pub pickup_max_y: f64,
    pub freeze_secs: f64,
    pub blast_growth: f64,
    pub cooldown_factor: f64,
    pub marker_secs: f64,
    pub popup_secs: f64,
}

impl Default for DefenseTuning {
    fn default() -> Self {
        Self {
            width: DEFENSE_WIDTH,
            height: DEFENSE_HEIGHT,
            ground_level: GROUND_LEVEL,
            grid_cell_size: GRID_CELL_SIZE,
            launcher_width: 50.0,
            launcher_height: 35.0,
            launcher_cooldown: 1.0,
            base_width: 80.0,
            base_height: 35.0,
            base_hp: 3,
            structure_spacing: 20.0,
            launcher_weight: 2.0,
            base_weight: 1.0,
            missile_speed: 500.0,
            blast: BlastTuning::default(),
            blast_points: 10,
            meteor_radius: 15.0,
            difficulty: LadderTuning::default(),
            rect_tolerance: 1.2,
            pickup_interval: 20.0,
            pickup_speed: 100.0,
            pickup_radius: 10.0,
            pickup_min_y: 150.0,
            pickup_max_y: 400.0,
            freeze_secs: 5.0,
            blast_growth: 1.1,
            cooldown_factor: 0.75,
            marker_secs: 0.5,
            popup_secs: 1.0,
        }
    }
}
