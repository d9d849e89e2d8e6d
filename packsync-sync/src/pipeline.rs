//! Sync pipeline entrypoint used by the CLI.
//!
//! Stages, strictly sequential:
//!
//! 1. Load Package Config and App Config.
//! 2. Plan the delta; stop if it is empty.
//! 3. Clear stale compiler output, write the work order, run the compiler.
//! 4. Reconcile assets, then persist App Config.
//! 5. Remove the work order and compiler output.
//!
//! Step 5 runs on every exit path once step 3 has started. A failure before
//! step 4 completes leaves App Config untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;

use packsync_core::{manifest, Manifest, ModelId, SyncConfig};

use crate::cleanup::{cleanup, clear_stale_output};
use crate::compiler::{self, Compiler};
use crate::error::SyncError;
use crate::plan::{plan, WorkOrder};
use crate::reconcile::{reconcile, Reconciled};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Every desired model is already compiled.
    UpToDate,
    /// `--dry-run`: these models would be compiled.
    WouldCompile { model_ids: Vec<ModelId> },
    /// Models compiled and appended to App Config; `bundled` had assets copied.
    Compiled {
        model_ids: Vec<ModelId>,
        bundled: Vec<ModelId>,
    },
}

/// Summary of a single sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    /// Device tag of the work order; `None` when nothing was planned.
    pub device: Option<String>,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// Run one synchronization for the project described by `config`.
pub fn run(
    config: &SyncConfig,
    compiler: &dyn Compiler,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();
    config.validate()?;

    let desired = manifest::load_at(&config.package_config)?;
    let app_config = manifest::load_at(&config.app_config)?;
    let compiled = manifest::compiled_identities(&app_config);

    let work_order = plan(&desired, &compiled, &config.default_device);
    if work_order.is_empty() {
        tracing::info!("no new models to compile");
        return Ok(SyncReport {
            started_at,
            device: None,
            outcome: SyncOutcome::UpToDate,
        });
    }
    tracing::info!(
        "{} new model(s) to compile for {}: {}",
        work_order.len(),
        work_order.device,
        join_ids(&work_order.model_ids())
    );

    if dry_run {
        return Ok(SyncReport {
            started_at,
            device: Some(work_order.device.clone()),
            outcome: SyncOutcome::WouldCompile {
                model_ids: work_order.model_ids(),
            },
        });
    }

    let merged = compile_and_merge(config, compiler, &work_order, app_config);
    let cleaned = cleanup(&config.transient_paths());

    let reconciled = match (merged, cleaned) {
        (Ok(reconciled), Ok(())) => reconciled,
        (Ok(_), Err(err)) => {
            tracing::warn!("app config was updated but transient state remains: {err}");
            return Err(err);
        }
        (Err(err), Ok(())) => return Err(err),
        (Err(err), Err(cleanup_err)) => {
            tracing::warn!("cleanup after failed sync also failed: {cleanup_err}");
            return Err(err);
        }
    };

    Ok(SyncReport {
        started_at,
        device: Some(work_order.device),
        outcome: SyncOutcome::Compiled {
            model_ids: reconciled.appended,
            bundled: reconciled.bundled,
        },
    })
}

fn compile_and_merge(
    config: &SyncConfig,
    compiler: &dyn Compiler,
    work_order: &WorkOrder,
    app_config: Manifest,
) -> Result<Reconciled, SyncError> {
    clear_stale_output(&config.output_dir)?;
    manifest::save_at(&config.work_order, &work_order.to_manifest())?;
    tracing::debug!("wrote work order to {}", config.work_order.display());

    let result = compiler::invoke(
        compiler,
        &config.work_order,
        &config.output_dir,
        &config.result_manifest_path(),
    )?;

    let reconciled = reconcile(
        app_config,
        result,
        work_order,
        &config.compiled_asset_root(),
        &config.bundle_dir,
    )?;

    manifest::save_at(&config.app_config, &reconciled.manifest)?;
    tracing::info!(
        "app config now lists {} model(s): {}",
        reconciled.manifest.model_list.len(),
        config.app_config.display()
    );
    Ok(reconciled)
}

fn join_ids(ids: &[ModelId]) -> String {
    ids.iter()
        .map(ModelId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use packsync_core::ArtifactEntry;
    use tempfile::TempDir;

    use super::*;
    use crate::error::CompilerError;

    struct NeverCalled(Cell<usize>);

    impl Compiler for NeverCalled {
        fn compile(&self, _: &Path, _: &Path) -> Result<(), CompilerError> {
            self.0.set(self.0.get() + 1);
            Err(CompilerError::Failed {
                program: "never".to_string(),
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            })
        }
    }

    fn write_package(cfg: &SyncConfig, ids: &[&str]) {
        let manifest = Manifest::with_entries(
            None,
            ids.iter().map(|id| ArtifactEntry::new(*id)).collect(),
        );
        manifest::save_at(&cfg.package_config, &manifest).expect("package config");
    }

    #[test]
    fn empty_package_config_is_up_to_date() {
        let root = TempDir::new().expect("root");
        let cfg = SyncConfig::with_defaults(root.path());
        let compiler = NeverCalled(Cell::new(0));
        let report = run(&cfg, &compiler, false).expect("run");
        assert_eq!(report.outcome, SyncOutcome::UpToDate);
        assert_eq!(compiler.0.get(), 0);
    }

    #[test]
    fn dry_run_plans_without_writing() {
        let root = TempDir::new().expect("root");
        let cfg = SyncConfig::with_defaults(root.path());
        write_package(&cfg, &["m1", "m2"]);
        let compiler = NeverCalled(Cell::new(0));

        let report = run(&cfg, &compiler, true).expect("run");
        assert_eq!(
            report.outcome,
            SyncOutcome::WouldCompile {
                model_ids: vec![ModelId::from("m1"), ModelId::from("m2")]
            }
        );
        assert_eq!(report.device.as_deref(), Some("iphone"));
        assert_eq!(compiler.0.get(), 0);
        assert!(!cfg.work_order.exists());
        assert!(!cfg.app_config.exists());
    }

    #[test]
    fn compiler_failure_leaves_app_config_and_cleans_up() {
        let root = TempDir::new().expect("root");
        let cfg = SyncConfig::with_defaults(root.path());
        write_package(&cfg, &["m1"]);
        let compiler = NeverCalled(Cell::new(0));

        let err = run(&cfg, &compiler, false).unwrap_err();
        assert!(matches!(err, SyncError::Compiler(CompilerError::Failed { .. })));
        assert_eq!(compiler.0.get(), 1);
        assert!(!cfg.app_config.exists(), "app config must not be written");
        assert!(!cfg.work_order.exists(), "work order must be discarded");
        assert!(!cfg.output_dir.exists());
    }

    #[test]
    fn report_serializes_with_flat_outcome_tag() {
        let report = SyncReport {
            started_at: Utc::now(),
            device: Some("iphone".to_string()),
            outcome: SyncOutcome::Compiled {
                model_ids: vec![ModelId::from("m1")],
                bundled: vec![],
            },
        };
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["outcome"], "compiled");
        assert_eq!(json["model_ids"][0], "m1");
        assert_eq!(json["device"], "iphone");
    }
}
