//! Manifest store and identity index.
//!
//! - [`load_at`] — read a manifest, substituting `{"model_list": []}` when the
//!   file is absent.
//! - [`load_required_at`] — same parse, but absence is an error.
//! - [`save_at`] — pretty JSON to `<file>.tmp`, then rename over the target.
//! - [`compiled_identities`] — the set of `model_id`s already present.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ManifestError};
use crate::types::{Manifest, ModelId};

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// Load the manifest at `path`.
///
/// A missing file yields [`Manifest::empty`]; a malformed one yields
/// [`ManifestError::Parse`] with the path attached.
pub fn load_at(path: &Path) -> Result<Manifest, ManifestError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse(path, &contents),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("no manifest at {}, using empty shape", path.display());
            Ok(Manifest::empty())
        }
        Err(err) => Err(io_err(path, err)),
    }
}

/// Load a manifest that must exist, such as the compiler's result manifest.
pub fn load_required_at(path: &Path) -> Result<Manifest, ManifestError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse(path, &contents),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(err) => Err(io_err(path, err)),
    }
}

fn parse(path: &Path, contents: &str) -> Result<Manifest, ManifestError> {
    serde_json::from_str(contents).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// 2. Save (atomic)
// ---------------------------------------------------------------------------

/// Sibling temp path used by [`save_at`]: `<file>.tmp`.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.tmp"))
}

/// Persist `manifest` at `path`, overwriting any previous content.
///
/// Write flow: serialize → `<file>.tmp` sibling → `rename`. The temp file sits
/// in the target's directory so the rename never crosses filesystems.
/// `model_list` order is written exactly as given.
pub fn save_at(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let json = serde_json::to_string_pretty(manifest)?;
    let tmp = tmp_path_for(path);
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }

    tracing::debug!(
        "saved manifest with {} model(s) to {}",
        manifest.model_list.len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Identity index
// ---------------------------------------------------------------------------

/// Project `model_list[*].model_id` into a set.
pub fn compiled_identities(manifest: &Manifest) -> BTreeSet<ModelId> {
    manifest
        .model_list
        .iter()
        .map(|entry| entry.model_id.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
