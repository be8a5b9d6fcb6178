use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Default high score file name
pub const DEFAULT_SCORES_FILE: &str = "scores.json";

/// On-disk form of the all-time high score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    #[serde(default)]
    pub highscore: u64,
}

/// Persists the single all-time high score as JSON.
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded high score; a missing file means none was set yet
    pub fn load(&self) -> Result<u64> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No high score file at {}", self.path.display());
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let record: HighScoreRecord = serde_json::from_str(&content)?;
        debug!("Loaded high score {}", record.highscore);
        Ok(record.highscore)
    }

    /// Overwrite the file with a new high score
    pub fn save(&self, highscore: u64) -> Result<()> {
        let content = serde_json::to_string_pretty(&HighScoreRecord { highscore })?;
        fs::write(&self.path, content)?;
        info!("Saved high score {} to {}", highscore, self.path.display());
        Ok(())
    }
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_SCORES_FILE)
    }
}
