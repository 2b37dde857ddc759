//! Saved diary persistence
//!
//! One JSON document per saved diary, written under the configured
//! diary directory. Documents are date-stamped and keyed by client so
//! a user saving on consecutive days gets separate files.

use chrono::Utc;
use diary_common::{Error, Result};
use std::path::{Path, PathBuf};

use crate::session::SessionSnapshot;

/// Writes saved diary snapshots to disk
#[derive(Debug, Clone)]
pub struct DiaryStore {
    dir: PathBuf,
}

impl DiaryStore {
    /// Open the store, creating the directory if missing
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Config(format!("Create diary dir {} failed: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Persist one session snapshot; returns the written path
    pub fn persist(&self, client_id: &str, snapshot: &SessionSnapshot) -> Result<PathBuf> {
        let date = Utc::now().format("%Y%m%d");
        let path = self.dir.join(format!("diary_{}_{}.json", date, client_id));

        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&path, json)?;

        tracing::info!(
            client_id = %client_id,
            path = %path.display(),
            "Diary saved"
        );

        Ok(path)
    }
}
