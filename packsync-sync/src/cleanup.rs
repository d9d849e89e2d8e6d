//! Session cleanup: discard the work order and compiler output.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Remove a file or directory tree. Returns `Ok(false)` if nothing was there.
pub(crate) fn remove_path(path: &Path) -> std::io::Result<bool> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match removed {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Remove every transient path.
///
/// Already-missing paths are fine. Every path is attempted even after a
/// failure; the first failure is returned.
pub fn cleanup(paths: &[PathBuf]) -> Result<(), SyncError> {
    let mut first_err = None;
    for path in paths {
        match remove_path(path) {
            Ok(true) => tracing::debug!("removed {}", path.display()),
            Ok(false) => {}
            Err(source) => {
                tracing::error!("could not remove {}: {source}", path.display());
                if first_err.is_none() {
                    first_err = Some(SyncError::Cleanup {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
    }
    first_err.map_or(Ok(()), Err)
}

/// Remove compiler output left behind by an interrupted run, so it can never
/// be read back as this run's result.
pub fn clear_stale_output(output_dir: &Path) -> Result<(), SyncError> {
    if remove_path(output_dir).map_err(|e| io_err(output_dir, e))? {
        tracing::warn!("removed stale compiler output at {}", output_dir.display());
    }
    Ok(())
}
