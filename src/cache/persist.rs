// Snapshot persistence for cached responses.
// Keeps the last successful payloads on disk so a restart within the TTL skips the network.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Result, ShowcaseError};

use super::paths;
use super::store::{CacheEntry, CachedData};

/// Single JSON file holding every cache entry.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in `dir`, or in the platform cache directory.
    pub fn in_dir(dir: Option<&Path>) -> Result<Self> {
        paths::snapshot_path(dir)
            .map(Self::new)
            .ok_or_else(|| ShowcaseError::Config("no cache directory available".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read persisted entries. A missing file is an empty snapshot.
    pub fn load(&self) -> Result<Vec<CacheEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let snapshot: CachedData<Vec<CacheEntry>> = serde_json::from_str(&contents)?;
        Ok(snapshot.data)
    }

    /// Replace the snapshot with `entries`.
    pub fn save(&self, entries: &[CacheEntry], saved_at: DateTime<Utc>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snapshot = CachedData::new(entries, saved_at);
        let json = serde_json::to_string_pretty(&snapshot)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
