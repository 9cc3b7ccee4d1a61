//! Round state machine shared by both games

use serde::{Deserialize, Serialize};

use crate::consts::MIN_EXPLODING_SECS;

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen, waiting for confirm
    #[default]
    Welcome,
    /// Controls screen, waiting for confirm
    Instructions,
    /// Active gameplay (the only phase that collides and spawns)
    Playing,
    /// Terminal animation: particles decay, nothing else runs
    Exploding,
    /// Round over, waiting for restart
    GameOver,
}

impl Phase {
    /// Whether collision and spawning run in this phase
    pub fn is_simulating(self) -> bool {
        self == Phase::Playing
    }

    /// Phase entered when the confirm intent arrives, if any.
    ///
    /// `GameOver -> Playing` is a restart and requires the caller to reset the round.
    pub fn on_confirm(self) -> Option<Phase> {
        match self {
            Phase::Welcome => Some(Phase::Instructions),
            Phase::Instructions | Phase::GameOver => Some(Phase::Playing),
            Phase::Playing | Phase::Exploding => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Welcome => "welcome",
            Phase::Instructions => "instructions",
            Phase::Playing => "playing",
            Phase::Exploding => "exploding",
            Phase::GameOver => "gameover",
        }
    }
}

/// Exploding ends once the terminal particles are gone and the minimum time has passed
pub fn exploding_finished(time_in_phase: f64, particles_empty: bool) -> bool {
    particles_empty && time_in_phase >= MIN_EXPLODING_SECS
}

/// Round lifecycle notifications drained by the loop owner (persistence hooks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted,
    RoundEnded { score: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_walks_intro_screens() {
        let mut phase = Phase::default();
        phase = phase.on_confirm().unwrap_or(phase);
        assert_eq!(phase, Phase::Instructions);
        phase = phase.on_confirm().unwrap_or(phase);
        assert_eq!(phase, Phase::Playing);
        assert_eq!(phase.on_confirm(), None);
    }

    #[test]
    fn test_only_playing_simulates() {
        for phase in [Phase::Welcome, Phase::Instructions, Phase::Exploding, Phase::GameOver] {
            assert!(!phase.is_simulating());
        }
        assert!(Phase::Playing.is_simulating());
    }

    #[test]
    fn test_exploding_needs_both_conditions() {
        assert!(!exploding_finished(0.2, true));
        assert!(!exploding_finished(5.0, false));
        assert!(exploding_finished(MIN_EXPLODING_SECS, true));
    }

    #[test]
    fn test_restart_from_game_over() {
        assert_eq!(Phase::GameOver.on_confirm(), Some(Phase::Playing));
        assert_eq!(Phase::Exploding.on_confirm(), None);
    }
}
