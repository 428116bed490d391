//! Transactional directory writer
//!
//! Applies a [`DirectoryBundle`] to disk all-or-nothing. A pre-existing
//! directory is snapshotted to a temp location before being cleared; any
//! write failure restores the snapshot, and the snapshot is always deleted
//! afterward so it never leaks into the user's filesystem.

use std::collections::BTreeMap;
use std::fs;

use tracing::{debug, warn};

use notif_fs::{NormalizedPath, TempProvider, dir};

use crate::bundle::DirectoryBundle;
use crate::{Error, Result};

/// Writes resource directories transactionally
#[derive(Debug, Default)]
pub struct DirectoryWriter {
    temp: TempProvider,
}

impl DirectoryWriter {
    /// Create a writer whose backup snapshots live under the given provider.
    pub fn new(temp: TempProvider) -> Self {
        Self { temp }
    }

    /// Write one bundle to `target`.
    ///
    /// The caller must serialize access to `target`; the backup/rollback
    /// protocol assumes nothing else touches the directory concurrently.
    pub fn write(&self, target: &NormalizedPath, bundle: &DirectoryBundle) -> Result<()> {
        let pre_existing = target.is_dir();

        // Snapshot handle doubles as cleanup: dropping it deletes the
        // backup whether the write succeeded or not.
        let backup = if pre_existing {
            let snapshot = self.temp.snapshot_dir()?;
            let snapshot_path = NormalizedPath::new(snapshot.path());
            dir::copy_dir(target, &snapshot_path)?;
            Some(snapshot)
        } else {
            fs::create_dir_all(target.as_ref())
                .map_err(|e| notif_fs::Error::io(target.to_native(), e))?;
            None
        };

        // Destructive work starts only once the snapshot exists: a clear
        // that fails partway restores from it like any write failure.
        let attempt = match &backup {
            Some(_) => dir::clear_dir(target)
                .map_err(Error::from)
                .and_then(|_| self.write_entries(target, bundle)),
            None => self.write_entries(target, bundle),
        };

        match attempt {
            Ok(()) => {
                debug!(dir = %target, "wrote resource directory");
                Ok(())
            }
            Err(e) => {
                warn!(dir = %target, error = %e, "write failed, rolling back");
                match &backup {
                    Some(snapshot) => {
                        // Restore the pre-write content byte for byte.
                        let snapshot_path = NormalizedPath::new(snapshot.path());
                        if let Err(restore_err) = dir::clear_dir(target)
                            .and_then(|_| dir::copy_dir(&snapshot_path, target))
                        {
                            warn!(dir = %target, error = %restore_err, "rollback failed");
                        }
                    }
                    None => {
                        if let Err(cleanup_err) = dir::remove_dir(target) {
                            warn!(dir = %target, error = %cleanup_err, "cleanup failed");
                        }
                    }
                }
                Err(e)
            }
        }
    }

    fn write_entries(&self, target: &NormalizedPath, bundle: &DirectoryBundle) -> Result<()> {
        let manifest_path = target.join(bundle.manifest_file_name());
        write_file(&manifest_path, bundle.manifest_json()?.as_bytes())?;

        for (rel_path, content) in bundle.files() {
            write_file(&target.join(rel_path), content.as_bytes())?;
        }

        Ok(())
    }

    /// Write a batch of bundles into an index directory, one subdirectory per
    /// resource key.
    ///
    /// Subdirectories that no longer match any key are pruned. Surviving
    /// subdirectories are left in place and overwritten by their own
    /// transaction, which is what preserves each resource's customized
    /// extraction layout. A failure on one resource stops the batch but does
    /// not roll back siblings already written; each resource's transaction is
    /// independent.
    pub fn write_index(
        &self,
        index_dir: &NormalizedPath,
        bundles: &BTreeMap<String, DirectoryBundle>,
    ) -> Result<()> {
        fs::create_dir_all(index_dir.as_ref())
            .map_err(|e| notif_fs::Error::io(index_dir.to_native(), e))?;

        for name in dir::list_subdirs(index_dir)? {
            if !bundles.contains_key(&name) {
                debug!(dir = %name, "pruning stale resource directory");
                dir::remove_dir(&index_dir.join(&name))?;
            }
        }

        for (name, bundle) in bundles {
            self.write(&index_dir.join(name), bundle)?;
        }

        Ok(())
    }
}

fn write_file(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native = path.to_native();
    if let Some(parent) = native.parent() {
        fs::create_dir_all(parent).map_err(|e| notif_fs::Error::io(parent, e))?;
    }
    fs::write(&native, content).map_err(|e| Error::Fs(notif_fs::Error::io(native, e)))
}
