use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use engine_logging::{engine_info, engine_warn};
use thiserror::Error;

use crate::{write_atomically, PersistError};

/// Format of the single line stored in the run-state file.
pub const RUN_STATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_RUN_STATE_FILE: &str = "last_run_date.txt";

#[derive(Debug, Error)]
pub enum RunStateError {
    #[error("run-state path {0:?} has no file name")]
    InvalidPath(PathBuf),
    #[error("failed to write run state: {0}")]
    Persist(#[from] PersistError),
}

/// Timestamp of the last completed run, kept in a one-line text file.
#[derive(Debug, Clone)]
pub struct RunStateStore {
    path: PathBuf,
}

impl RunStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `None` on first run. An unreadable or malformed file is logged and
    /// also reads as `None`, so the user is steered towards a full scan.
    pub fn load(&self) -> Option<NaiveDateTime> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                engine_warn!("Failed to read run state from {:?}: {}", self.path, err);
                return None;
            }
        };

        match NaiveDateTime::parse_from_str(content.trim(), RUN_STATE_FORMAT) {
            Ok(timestamp) => Some(timestamp),
            Err(err) => {
                engine_warn!(
                    "Ignoring malformed run state {:?} in {:?}: {}",
                    content.trim(),
                    self.path,
                    err
                );
                None
            }
        }
    }

    pub fn save(&self, timestamp: NaiveDateTime) -> Result<(), RunStateError> {
        if self.path.file_name().is_none() {
            return Err(RunStateError::InvalidPath(self.path.clone()));
        }

        let line = timestamp.format(RUN_STATE_FORMAT).to_string();
        write_atomically(&self.path, &line)?;
        engine_info!("Saved run state {} to {:?}", line, self.path);
        Ok(())
    }
}

impl Default for RunStateStore {
    fn default() -> Self {
        Self::new(DEFAULT_RUN_STATE_FILE)
    }
}
