//! Platform layer
//!
//! Shared pieces both drivers need:
//! - Game selection
//! - Keyboard mapping onto [`TickInput`]
//! - Pointer to world coordinate mapping
//!
//! The browser driver (requestAnimationFrame loop, visibility pause,
//! LocalStorage) lives in `web` and only builds for wasm32.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;

use crate::game_loop::Simulation;
use crate::settings::Settings;
use crate::sim::TickInput;
use crate::tuning::Tuning;
use crate::{asteroids::AsteroidsGame, defense::DefenseGame};

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::start_game;

/// Which game to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Asteroids,
    Defense,
}

impl GameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Asteroids => "asteroids",
            GameKind::Defense => "defense",
        }
    }

    /// LocalStorage / file key for this game's high score
    pub fn high_score_key(self) -> &'static str {
        match self {
            GameKind::Asteroids => "roid_rush_asteroids_high_score",
            GameKind::Defense => "roid_rush_defense_high_score",
        }
    }

    /// Playfield size in world units
    pub fn playfield(self, tuning: &Tuning) -> DVec2 {
        match self {
            GameKind::Asteroids => DVec2::new(tuning.asteroids.width, tuning.asteroids.height),
            GameKind::Defense => DVec2::new(tuning.defense.width, tuning.defense.height),
        }
    }

    /// Build a fresh game on its welcome screen
    pub fn build(self, seed: u64, tuning: &Tuning, settings: Settings) -> Box<dyn Simulation> {
        match self {
            GameKind::Asteroids => Box::new(AsteroidsGame::new(seed, tuning.asteroids.clone(), settings)),
            GameKind::Defense => Box::new(DefenseGame::new(seed, tuning.defense.clone(), settings)),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asteroids" => Ok(GameKind::Asteroids),
            "defense" | "missile-defense" => Ok(GameKind::Defense),
            other => Err(format!("unknown game '{other}' (expected asteroids or defense)")),
        }
    }
}

/// Apply a key press or release (DOM `KeyboardEvent.key` names).
///
/// Returns true when the key is one of ours, so the driver can suppress the
/// browser default (page scrolling on arrows and space).
pub fn apply_key(input: &mut TickInput, key: &str, pressed: bool) -> bool {
    match key {
        "ArrowUp" | "w" | "W" => input.forward = pressed,
        "ArrowDown" | "s" | "S" => input.backward = pressed,
        "ArrowLeft" | "a" | "A" => input.rotate_left = pressed,
        "ArrowRight" | "d" | "D" => input.rotate_right = pressed,
        " " => input.fire = pressed,
        "Enter" => {
            if pressed {
                input.confirm = true;
            }
        }
        _ => return false,
    }
    true
}

/// The one queued animation frame.
///
/// Pausing cancels the queued frame and resuming only queues a new one when
/// the slot is empty, so hide/show cycles never leave two frame chains running.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameSlot {
    pending: Option<i32>,
}

impl FrameSlot {
    /// Whether a new frame may be requested
    pub fn is_free(&self) -> bool {
        self.pending.is_none()
    }

    /// Record the handle returned by `requestAnimationFrame`
    pub fn fill(&mut self, handle: i32) {
        self.pending = Some(handle);
    }

    /// The queued frame is running now
    pub fn fired(&mut self) {
        self.pending = None;
    }

    /// Empty the slot, returning the handle to pass to `cancelAnimationFrame`
    pub fn cancel(&mut self) -> Option<i32> {
        self.pending.take()
    }
}

/// Map a pointer position inside an element's client rect to world coordinates
pub fn client_to_world(client: DVec2, rect_origin: DVec2, rect_size: DVec2, playfield: DVec2) -> DVec2 {
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return DVec2::ZERO;
    }
    (client - rect_origin) / rect_size * playfield
}
