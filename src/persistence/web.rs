//! Browser LocalStorage backend

use super::{Envelope, HighScoreStore};
use crate::error::PersistError;

/// The window's LocalStorage
pub fn local_storage() -> Result<web_sys::Storage, PersistError> {
    let window = web_sys::window().ok_or_else(|| PersistError::Storage("no window".into()))?;
    window
        .local_storage()
        .map_err(|_| PersistError::Storage("localStorage access denied".into()))?
        .ok_or_else(|| PersistError::Storage("localStorage missing".into()))
}

/// High score under a single LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn read(&self) -> Result<Option<u64>, PersistError> {
        let storage = local_storage()?;
        let item = storage
            .get_item(&self.key)
            .map_err(|_| PersistError::Storage("getItem failed".into()))?;
        match item {
            Some(json) => Ok(Some(Envelope::from_json(&json)?.high_score)),
            None => Ok(None),
        }
    }
}

impl HighScoreStore for LocalStorageStore {
    fn load_high_score(&self) -> u64 {
        match self.read() {
            Ok(Some(score)) => {
                log::info!("Loaded high score {score}");
                score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("Ignoring stored high score: {e}");
                0
            }
        }
    }

    fn save_high_score(&mut self, score: u64) -> Result<(), PersistError> {
        let json = Envelope::new(score).to_json()?;
        local_storage()?
            .set_item(&self.key, &json)
            .map_err(|_| PersistError::Storage("setItem rejected".into()))?;
        log::info!("High score {score} saved");
        Ok(())
    }
}
