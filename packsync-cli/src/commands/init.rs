//! `packsync init [<path>] [--force]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use packsync_core::config;

/// Write a default `packsync.yaml`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project root directory.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing packsync.yaml.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let root = self
            .path
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.path.display()))?;

        let written = config::write_default_at(&root, self.force)
            .with_context(|| format!("failed to init '{}'", root.display()))?;

        println!("✓ Wrote {}", written.display());
        Ok(())
    }
}
