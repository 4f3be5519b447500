//! JSON save file with atomic replacement.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::record::{PlayerProgressRecord, RECORD_VERSION};

/// Directory under the platform data dir that holds the save.
const SAVE_DIR_NAME: &str = "lane-battle";

pub const SAVE_FILE_NAME: &str = "player_progress_v1.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Save file not found")]
    NotFound,

    #[error("Incompatible save version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },
}

/// Where progress lives on disk.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SaveStore {
    path: PathBuf,
}

impl Default for SaveStore {
    fn default() -> Self {
        let dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(SAVE_DIR_NAME).join(SAVE_FILE_NAME))
    }
}

impl SaveStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the save file.
    ///
    /// # Errors
    ///
    /// `NotFound` if there is no save yet, `Serialization` for malformed JSON,
    /// `IncompatibleVersion` for a record written by a newer layout.
    pub fn load(&self) -> Result<PlayerProgressRecord, SaveError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(SaveError::NotFound),
            Err(err) => return Err(err.into()),
        };
        let record: PlayerProgressRecord = serde_json::from_str(&text)?;
        if record.version > RECORD_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: RECORD_VERSION,
                found: record.version,
            });
        }
        Ok(record)
    }

    /// Writes `record` as pretty JSON, replacing any previous save atomically.
    ///
    /// # Errors
    ///
    /// Any filesystem or serialization failure.
    pub fn save(&self, record: &PlayerProgressRecord) -> Result<(), SaveError> {
        let text = serde_json::to_string_pretty(record)?;
        write_text_atomic(&self.path, &text)?;
        Ok(())
    }

    /// Loads the save, falling back to a new game on any failure.
    #[must_use]
    pub fn load_or_new(&self, now: DateTime<Utc>) -> PlayerProgressRecord {
        match self.load() {
            Ok(record) => record,
            Err(SaveError::NotFound) => {
                info!("No save at {}; starting a new game", self.path.display());
                PlayerProgressRecord::new_game(now)
            }
            Err(err) => {
                warn!(
                    "Could not load save at {}: {err}; starting a new game",
                    self.path.display()
                );
                PlayerProgressRecord::new_game(now)
            }
        }
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text.as_bytes())?;
    replace_file(&tmp_path, path)
}

/// `rename` replaces `final_path` in one step; the old save stays intact until then.
fn replace_file(tmp_path: &Path, final_path: &Path) -> io::Result<()> {
    if let Err(err) = fs::rename(tmp_path, final_path) {
        let _ = fs::remove_file(tmp_path);
        return Err(err);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(SAVE_FILE_NAME);
    path.with_file_name(format!("{file_name}.tmp"))
}
