//! `packsync sync` — compile new models and merge them into the app config.

use anyhow::{Context, Result};
use clap::Args;

use packsync_sync::{pipeline, ExternalCompiler, SyncOutcome, SyncReport};

use super::ProjectArgs;

/// Arguments for `packsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Device tag used when the package config does not name one.
    #[arg(long)]
    pub device: Option<String>,

    /// Compiler program to run instead of the configured one.
    #[arg(long)]
    pub compiler: Option<String>,

    /// Show what would be compiled without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let mut cfg = self.project.load()?;
        if let Some(device) = self.device {
            cfg.default_device = device;
        }
        if let Some(program) = self.compiler {
            cfg.compiler.program = program;
        }

        let compiler = ExternalCompiler::from_config(&cfg.compiler, &cfg.root);
        let report = pipeline::run(&cfg, &compiler, self.dry_run)
            .with_context(|| format!("sync failed for '{}'", cfg.root.display()))?;
        print_report(&report, self.json)
    }
}

pub(crate) fn print_report(report: &SyncReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("failed to serialize sync report")?
        );
        return Ok(());
    }

    let device = report.device.as_deref().unwrap_or_default();
    match &report.outcome {
        SyncOutcome::UpToDate => println!("No new models to compile"),
        SyncOutcome::WouldCompile { model_ids } => {
            println!(
                "[dry-run] would compile {} model(s) for '{device}'",
                model_ids.len()
            );
            for id in model_ids {
                println!("  ~  {id}");
            }
        }
        SyncOutcome::Compiled { model_ids, bundled } => {
            println!(
                "✓ compiled {} model(s) for '{device}' ({} bundled)",
                model_ids.len(),
                bundled.len()
            );
            for id in model_ids {
                let tag = if bundled.contains(id) { "  (bundled)" } else { "" };
                println!("  ✎  {id}{tag}");
            }
        }
    }
    Ok(())
}
