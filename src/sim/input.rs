//! Per-tick input intents
//!
//! Platform drivers translate keyboard, mouse and touch into this struct.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Thrust along the heading (held)
    pub forward: bool,
    /// Reverse thrust (held)
    pub backward: bool,
    /// Turn counter-clockwise (held)
    pub rotate_left: bool,
    /// Turn clockwise (held)
    pub rotate_right: bool,
    /// Fire every ready weapon (held)
    pub fire: bool,
    /// Target point for a defensive missile (one-shot)
    pub aim: Option<DVec2>,
    /// Advance a menu screen or restart (one-shot)
    pub confirm: bool,
}

impl TickInput {
    /// Clear one-shot intents after a tick consumed them
    pub fn clear_one_shots(&mut self) {
        self.aim = None;
        self.confirm = false;
    }

    /// Clear held intents (focus loss, pause)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_one_shots_keeps_held() {
        let mut input = TickInput {
            forward: true,
            fire: true,
            aim: Some(DVec2::new(10.0, 20.0)),
            confirm: true,
            ..Default::default()
        };
        input.clear_one_shots();
        assert!(input.forward && input.fire);
        assert_eq!(input.aim, None);
        assert!(!input.confirm);
    }
}
