//! `packsync plan` — show the work order the next sync would hand the compiler.

use anyhow::{Context, Result};
use clap::Args;

use packsync_sync::{pipeline, ExternalCompiler};

use super::{sync::print_report, ProjectArgs};

/// Arguments for `packsync plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.project.load()?;
        let compiler = ExternalCompiler::from_config(&cfg.compiler, &cfg.root);
        let report = pipeline::run(&cfg, &compiler, true)
            .with_context(|| format!("plan failed for '{}'", cfg.root.display()))?;
        print_report(&report, self.json)
    }
}
