//! Domain types for packsync manifests.
//!
//! Package Config, App Config, the transient work order and the compiler's
//! result manifest all share the [`Manifest`] shape. Fields the sync core does
//! not interpret are carried through untouched, in their original key order.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity key of an artifact (`model_id`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One buildable or compiled unit in a `model_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub model_id: ModelId,
    /// Desired-side only: copy this artifact's asset tree into the bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_weight: Option<bool>,
    /// `model_lib`, `model_path`, `estimated_vram_bytes`, … — opaque here.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ArtifactEntry {
    pub fn new(model_id: impl Into<ModelId>) -> Self {
        Self {
            model_id: model_id.into(),
            bundle_weight: None,
            fields: Map::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }

    pub fn with_bundle_weight(mut self, bundle: bool) -> Self {
        self.bundle_weight = Some(bundle);
        self
    }

    /// Absent `bundle_weight` is treated as `false`.
    pub fn bundles_weight(&self) -> bool {
        self.bundle_weight.unwrap_or(false)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// A manifest document: `{ device?, model_list, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Insertion order is meaningful: later entries are newer.
    pub model_list: Vec<ArtifactEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// The canonical empty shape, `{"model_list": []}`.
    pub fn empty() -> Self {
        Self {
            device: None,
            model_list: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_entries(device: Option<String>, model_list: Vec<ArtifactEntry>) -> Self {
        Self {
            device,
            model_list,
            extra: Map::new(),
        }
    }

    pub fn find(&self, model_id: &ModelId) -> Option<&ArtifactEntry> {
        self.model_list.iter().find(|e| &e.model_id == model_id)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
