//! Error types for the outer surfaces (persistence and tuning files)
//!
//! The simulation itself never fails: inactive entities are no-ops and
//! out-of-range tuning is clamped.

use thiserror::Error;

/// High score storage failure
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("high score file I/O failed")]
    Io(#[from] std::io::Error),
    #[error("high score data is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("browser storage unavailable: {0}")]
    Storage(String),
    #[error("unsupported high score format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Tuning file failure
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("failed to read tuning file")]
    Io(#[from] std::io::Error),
    #[error("tuning is not valid JSON")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PersistError::UnsupportedVersion { found: 9, expected: 1 };
        assert_eq!(
            err.to_string(),
            "unsupported high score format version 9 (expected 1)"
        );
        let err = PersistError::Storage("no window".into());
        assert_eq!(err.to_string(), "browser storage unavailable: no window");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<u64, _> = serde_json::from_str("nope");
        let err: TuningError = parse.unwrap_err().into();
        assert!(matches!(err, TuningError::Json(_)));
    }
}
