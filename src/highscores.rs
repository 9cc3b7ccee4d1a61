//! Best score tracking
//!
//! A single number that only ever goes up. Storage lives behind
//! [`crate::persistence::HighScoreStore`].

use serde::{Deserialize, Serialize};

/// Best score seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    best: u64,
}

impl HighScore {
    pub fn best(&self) -> u64 {
        self.best
    }

    /// Check if a score would replace the current best
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a finished round. Returns true when it set a new best.
    pub fn submit(&mut self, score: u64) -> bool {
        if self.qualifies(score) {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Merge a value read from storage without ever lowering the best
    pub fn merge(&mut self, stored: u64) {
        self.best = self.best.max(stored);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_is_monotonic() {
        let mut high = HighScore::default();
        assert!(high.submit(120));
        assert!(!high.submit(80));
        assert!(!high.submit(120));
        assert_eq!(high.best(), 120);
        assert!(high.submit(121));
        assert_eq!(high.best(), 121);
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!HighScore::default().qualifies(0));
    }

    #[test]
    fn test_merge_keeps_larger() {
        let mut high = HighScore::default();
        high.merge(50);
        high.merge(10);
        assert_eq!(high.best(), 50);
        high.merge(75);
        assert_eq!(high.best(), 75);
    }
}
