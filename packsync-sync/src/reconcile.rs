//! Merge & asset reconciliation.
//!
//! Folds the compiler's result manifest into App Config and copies the asset
//! trees of bundled models into the canonical bundle directory.
//!
//! Ordering guarantee: every asset copy completes before App Config is
//! modified, so a copy failure leaves the canonical manifest untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;

use walkdir::WalkDir;

use packsync_core::{ArtifactEntry, Manifest, ModelId};

use crate::error::{CompilerError, SyncError};
use crate::plan::WorkOrder;

/// Result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// App Config with the result entries appended.
    pub manifest: Manifest,
    /// Models appended, in result order.
    pub appended: Vec<ModelId>,
    /// Models whose asset trees were copied into the bundle.
    pub bundled: Vec<ModelId>,
}

/// Pair each result entry with the work-order entry of the same `model_id`.
///
/// The compiler is not trusted to preserve order; it must however cover the
/// work order exactly, one result entry per planned model.
pub fn pair_by_identity<'a>(
    result: &'a Manifest,
    work_order: &'a WorkOrder,
) -> Result<Vec<(&'a ArtifactEntry, &'a ArtifactEntry)>, CompilerError> {
    let planned: BTreeMap<&ModelId, &ArtifactEntry> =
        work_order.entries.iter().map(|e| (&e.model_id, e)).collect();

    let mut pairs = Vec::with_capacity(result.model_list.len());
    let mut seen = BTreeSet::new();
    let mut unexpected = Vec::new();

    for compiled in &result.model_list {
        match planned.get(&compiled.model_id) {
            Some(desired) if seen.insert(&compiled.model_id) => pairs.push((compiled, *desired)),
            _ => unexpected.push(compiled.model_id.clone()),
        }
    }

    let missing: Vec<ModelId> = work_order
        .entries
        .iter()
        .filter(|e| !seen.contains(&e.model_id))
        .map(|e| e.model_id.clone())
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(CompilerError::ResultMismatch {
            missing,
            unexpected,
        });
    }
    Ok(pairs)
}

/// Merge `result` into `app_config`.
///
/// For every pair whose work-order entry has `bundle_weight: true`, the tree
/// `asset_root/<model_id>` is merge-copied into `bundle_root/<model_id>`.
/// Then `result.model_list` is appended, in its given order.
///
/// `model_id` uniqueness in the returned manifest relies on the planner
/// having excluded already-compiled identities; it is not re-checked here.
pub fn reconcile(
    mut app_config: Manifest,
    result: Manifest,
    work_order: &WorkOrder,
    asset_root: &Path,
    bundle_root: &Path,
) -> Result<Reconciled, SyncError> {
    let pairs = pair_by_identity(&result, work_order)?;

    let mut bundled = Vec::new();
    for (compiled, desired) in pairs {
        if !desired.bundles_weight() {
            continue;
        }
        let id = &compiled.model_id;
        let from = asset_root.join(id.as_str());
        let to = bundle_root.join(id.as_str());
        let files = copy_tree(&from, &to).map_err(|source| SyncError::AssetCopy {
            model_id: id.clone(),
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        tracing::info!("bundled {} ({} file(s)) into {}", id, files, to.display());
        bundled.push(id.clone());
    }

    let appended: Vec<ModelId> = result.model_list.iter().map(|e| e.model_id.clone()).collect();
    app_config.model_list.extend(result.model_list);

    Ok(Reconciled {
        manifest: app_config,
        appended,
        bundled,
    })
}

/// Recursively copy `from` into `to`, merging with whatever `to` already
/// holds. Files present in both are overwritten. Returns the number of files
/// copied.
pub fn copy_tree(from: &Path, to: &Path) -> std::io::Result<u64> {
    if !from.is_dir() {
        return Err(std::io::Error::new(
            ErrorKind::NotFound,
            format!("asset directory {} does not exist", from.display()),
        ));
    }

    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
