//! Injectable temp-location provider

use std::path::PathBuf;

use tempfile::TempDir;

use crate::{Error, Result};

/// Provides locations for short-lived scratch directories.
///
/// The writer's backup snapshots live under the provider's root. Injecting
/// the root (instead of a process-wide constant) lets tests isolate their
/// scratch space and run in parallel.
#[derive(Debug, Clone)]
pub struct TempProvider {
    root: PathBuf,
}

impl TempProvider {
    /// Create a provider rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the provider root.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Create a fresh uniquely named snapshot directory under the root.
    ///
    /// The returned handle deletes the directory when dropped, so snapshots
    /// cannot leak past the operation that created them.
    pub fn snapshot_dir(&self) -> Result<TempDir> {
        std::fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
        tempfile::Builder::new()
            .prefix("notif-backup-")
            .tempdir_in(&self.root)
            .map_err(|e| Error::TempDir {
                root: self.root.clone(),
                source: e,
            })
    }
}

impl Default for TempProvider {
    fn default() -> Self {
        Self {
            root: std::env::temp_dir(),
        }
    }
}
