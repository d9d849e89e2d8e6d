//! Delta planner: desired minus already-compiled, by `model_id`.

use std::collections::BTreeSet;

use packsync_core::{ArtifactEntry, Manifest, ModelId};

/// The minimal set of artifacts to hand to the external compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrder {
    pub device: String,
    /// Desired-side entries, in Package Config order.
    pub entries: Vec<ArtifactEntry>,
}

impl WorkOrder {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        self.entries.iter().map(|e| e.model_id.clone()).collect()
    }

    /// File shape consumed by the compiler: `{ device, model_list }`.
    pub fn to_manifest(&self) -> Manifest {
        Manifest::with_entries(Some(self.device.clone()), self.entries.clone())
    }
}

/// Compute the work order for `desired` given the identities already compiled.
///
/// Relative order of `desired.model_list` is kept. A `model_id` repeated in
/// the desired manifest is planned once (first occurrence wins).
pub fn plan(desired: &Manifest, compiled: &BTreeSet<ModelId>, default_device: &str) -> WorkOrder {
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();

    for entry in &desired.model_list {
        if compiled.contains(&entry.model_id) {
            tracing::debug!("already compiled: {}", entry.model_id);
            continue;
        }
        if !seen.insert(entry.model_id.clone()) {
            tracing::warn!(
                "duplicate model_id '{}' in package config; planning first occurrence only",
                entry.model_id
            );
            continue;
        }
        entries.push(entry.clone());
    }

    let device = desired
        .device
        .clone()
        .unwrap_or_else(|| default_device.to_string());

    WorkOrder { device, entries }
}
