//! High score persistence
//!
//! The loop reads the stored value when a round starts and writes it when a
//! round ends with a new best. Backends:
//! - `MemoryStore`: tests and headless runs
//! - `JsonFileStore`: native, versioned JSON envelope
//! - `LocalStorageStore`: browser (wasm32 only)

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;

/// Current envelope format version
pub const FORMAT_VERSION: u32 = 1;

/// Where the best score lives between sessions
pub trait HighScoreStore {
    /// Stored best score; missing or unreadable data reads as 0
    fn load_high_score(&self) -> u64;

    fn save_high_score(&mut self, score: u64) -> Result<(), PersistError>;
}

/// Versioned on-disk / in-storage representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub high_score: u64,
}

impl Envelope {
    pub fn new(high_score: u64) -> Self {
        Self {
            version: FORMAT_VERSION,
            high_score,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and check the version
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let envelope: Envelope = serde_json::from_str(json)?;
        if envelope.version != FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: envelope.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(envelope)
    }
}

/// Volatile store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: u64,
    saves: u32,
    loads: Cell<u32>,
}

impl MemoryStore {
    pub fn with_value(value: u64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Number of reads (for tests)
    pub fn load_count(&self) -> u32 {
        self.loads.get()
    }

    /// Number of successful saves (for tests)
    pub fn save_count(&self) -> u32 {
        self.saves
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&self) -> u64 {
        self.loads.set(self.loads.get() + 1);
        self.value
    }

    fn save_high_score(&mut self, score: u64) -> Result<(), PersistError> {
        self.value = score;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::{LocalStorageStore, local_storage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_version_check() {
        let json = Envelope::new(42).to_json().expect("serializes");
        assert_eq!(Envelope::from_json(&json).expect("parses").high_score, 42);

        let future = r#"{ "version": 7, "high_score": 1 }"#;
        assert!(matches!(
            Envelope::from_json(future),
            Err(PersistError::UnsupportedVersion { found: 7, expected: 1 })
        ));
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(Envelope::from_json("{ nope"), Err(PersistError::Json(_))));
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::with_value(5);
        assert_eq!(store.load_high_score(), 5);
        store.save_high_score(9).expect("memory save");
        assert_eq!(store.load_high_score(), 9);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load_count(), 2);
    }
}
