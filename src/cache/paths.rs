// Cache path utilities.
// Resolves where the response snapshot lives on disk.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// File holding the persisted response snapshot.
pub const SNAPSHOT_FILE: &str = "github-data.json";

/// Get the base cache directory (~/.cache/showcase on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "showcase").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the snapshot file, under `override_dir` if given.
pub fn snapshot_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    match override_dir {
        Some(dir) => Some(dir.join(SNAPSHOT_FILE)),
        None => cache_dir().map(|dir| dir.join(SNAPSHOT_FILE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_path_override() {
        let path = snapshot_path(Some(Path::new("/tmp/showcase-test"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/showcase-test/github-data.json"));
    }

    #[test]
    fn test_default_snapshot_path() {
        // Some CI sandboxes have no home directory.
        if let Some(path) = snapshot_path(None) {
            assert!(path.ends_with(SNAPSHOT_FILE));
        }
    }
}
