//! Error types for packsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use packsync_core::{ConfigError, ManifestError, ModelId};

/// Failures of the external compiler boundary. Any of these aborts the run
/// before App Config is touched.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// The compiler process could not be started at all.
    #[error("failed to spawn compiler '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler ran and exited unsuccessfully.
    #[error("compiler '{program}' failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The compiler exited successfully but did not produce its result manifest.
    #[error("compiler output missing: {path}")]
    MissingOutput { path: PathBuf },

    /// The result manifest does not cover the work order one-to-one.
    #[error("compiler result does not match work order (missing: {missing:?}, unexpected: {unexpected:?})")]
    ResultMismatch {
        missing: Vec<ModelId>,
        unexpected: Vec<ModelId>,
    },
}

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("compiler error: {0}")]
    Compiler(#[from] CompilerError),

    /// Copying a bundled asset tree into the canonical bundle failed.
    #[error("failed to copy assets for '{model_id}' from {from} to {to}: {source}")]
    AssetCopy {
        model_id: ModelId,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A transient path exists but could not be removed.
    #[error("failed to clean up {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
