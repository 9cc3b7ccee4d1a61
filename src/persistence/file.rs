//! Native JSON file backend

use std::fs;
use std::path::{Path, PathBuf};

use super::{Envelope, HighScoreStore};
use crate::error::PersistError;

/// High score kept in a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict read; distinguishes a missing file from a corrupt one
    pub fn read(&self) -> Result<Option<u64>, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(Envelope::from_json(&text)?.high_score)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&self) -> u64 {
        match self.read() {
            Ok(Some(score)) => {
                log::info!("Loaded high score {score} from {}", self.path.display());
                score
            }
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Ignoring high score file {}: {e}", self.path.display());
                0
            }
        }
    }

    /// Write to a temp file and rename over the old one
    fn save_high_score(&mut self, score: u64) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, Envelope::new(score).to_json()?)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("High score {score} saved to {}", self.path.display());
        Ok(())
    }
}
