//! packsync core library — manifest types, manifest store, project config.
//!
//! Public API surface:
//! - [`types`] — [`ModelId`], [`ArtifactEntry`], [`Manifest`]
//! - [`manifest`] — load / save / identity index
//! - [`config`] — `packsync.yaml` and resolved [`SyncConfig`]
//! - [`error`] — [`ManifestError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod manifest;
pub mod types;

pub use config::SyncConfig;
pub use error::{ConfigError, ManifestError};
pub use types::{ArtifactEntry, Manifest, ModelId};
