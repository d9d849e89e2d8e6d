pub mod init;
pub mod plan;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use packsync_core::{config, SyncConfig};

/// Project location flags shared by every command that reads manifests.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project root; relative manifest paths resolve against it.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file, relative to the root (default: packsync.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ProjectArgs {
    pub fn load(&self) -> Result<SyncConfig> {
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("cannot resolve project root '{}'", self.root.display()))?;
        let cfg = config::load_at(&root, self.config.as_deref())
            .with_context(|| format!("failed to load config for '{}'", root.display()))?;
        tracing::debug!(?cfg, "loaded project config");
        Ok(cfg)
    }
}
