//! Per-model sync status.
//!
//! Signal precedence for desired models:
//! 1. `Pending` (not in App Config yet)
//! 2. `MissingAssets` (compiled, `bundle_weight: true`, bundle dir absent)
//! 3. `Compiled`
//!
//! Models present in App Config but no longer desired are `Orphan`. They are
//! listed after the desired models, in App Config order.

use std::fmt;

use serde::Serialize;

use packsync_core::{manifest, ArtifactEntry, ModelId, SyncConfig};

use crate::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSignal {
    Compiled,
    Pending,
    MissingAssets,
    Orphan,
}

impl fmt::Display for ModelSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSignal::Compiled => write!(f, "compiled"),
            ModelSignal::Pending => write!(f, "pending"),
            ModelSignal::MissingAssets => write!(f, "missing assets"),
            ModelSignal::Orphan => write!(f, "orphan"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub model_id: ModelId,
    pub signal: ModelSignal,
    pub bundle_weight: bool,
    /// `model_lib` from App Config, when compiled.
    pub model_lib: Option<String>,
}

/// Classify every model in Package Config and App Config.
pub fn check(config: &SyncConfig) -> Result<Vec<ModelStatus>, SyncError> {
    let desired = manifest::load_at(&config.package_config)?;
    let app_config = manifest::load_at(&config.app_config)?;

    let mut statuses: Vec<ModelStatus> = Vec::new();
    for wanted in &desired.model_list {
        if statuses.iter().any(|s| s.model_id == wanted.model_id) {
            continue;
        }
        let compiled = app_config.find(&wanted.model_id);
        let signal = match compiled {
            None => ModelSignal::Pending,
            Some(_)
                if wanted.bundles_weight()
                    && !config.bundle_dir.join(wanted.model_id.as_str()).is_dir() =>
            {
                ModelSignal::MissingAssets
            }
            Some(_) => ModelSignal::Compiled,
        };
        statuses.push(ModelStatus {
            model_id: wanted.model_id.clone(),
            signal,
            bundle_weight: wanted.bundles_weight(),
            model_lib: compiled.and_then(model_lib),
        });
    }

    for entry in &app_config.model_list {
        if desired.find(&entry.model_id).is_none() {
            statuses.push(ModelStatus {
                model_id: entry.model_id.clone(),
                signal: ModelSignal::Orphan,
                bundle_weight: false,
                model_lib: model_lib(entry),
            });
        }
    }

    Ok(statuses)
}

fn model_lib(entry: &ArtifactEntry) -> Option<String> {
    entry
        .field("model_lib")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use packsync_core::Manifest;
    use tempfile::TempDir;

    use super::*;

    fn signals(statuses: &[ModelStatus]) -> Vec<(&str, ModelSignal)> {
        statuses
            .iter()
            .map(|s| (s.model_id.as_str(), s.signal))
            .collect()
    }

    #[test]
    fn nothing_configured_yields_no_statuses() {
        let root = TempDir::new().expect("root");
        let cfg = SyncConfig::with_defaults(root.path());
        assert!(check(&cfg).expect("check").is_empty());
    }

    #[test]
    fn classifies_pending_compiled_missing_assets_and_orphans() {
        let root = TempDir::new().expect("root");
        let cfg = SyncConfig::with_defaults(root.path());

        let desired = Manifest::with_entries(
            None,
            vec![
                ArtifactEntry::new("new"),
                ArtifactEntry::new("plain"),
                ArtifactEntry::new("bundled").with_bundle_weight(true),
                ArtifactEntry::new("bundled-ok").with_bundle_weight(true),
            ],
        );
        manifest::save_at(&cfg.package_config, &desired).expect("package");

        let app = Manifest::with_entries(
            None,
            vec![
                ArtifactEntry::new("gone").with_field("model_lib", "lib_gone"),
                ArtifactEntry::new("plain").with_field("model_lib", "lib_plain"),
                ArtifactEntry::new("bundled"),
                ArtifactEntry::new("bundled-ok"),
            ],
        );
        manifest::save_at(&cfg.app_config, &app).expect("app");
        std::fs::create_dir_all(cfg.bundle_dir.join("bundled-ok")).expect("assets");

        let statuses = check(&cfg).expect("check");
        assert_eq!(
            signals(&statuses),
            vec![
                ("new", ModelSignal::Pending),
                ("plain", ModelSignal::Compiled),
                ("bundled", ModelSignal::MissingAssets),
                ("bundled-ok", ModelSignal::Compiled),
                ("gone", ModelSignal::Orphan),
            ]
        );
        assert_eq!(statuses[1].model_lib.as_deref(), Some("lib_plain"));
        assert_eq!(statuses[4].model_lib.as_deref(), Some("lib_gone"));
    }

    #[test]
    fn signal_display() {
        assert_eq!(ModelSignal::MissingAssets.to_string(), "missing assets");
        assert_eq!(ModelSignal::Orphan.to_string(), "orphan");
    }
}
