//! Error types for packsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or persisting manifest documents.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not valid manifest JSON.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (save path).
    #[error("manifest serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A manifest that must exist was absent.
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },
}

/// Errors from the `packsync.yaml` project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and serde_yaml line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `init` refuses to clobber an existing config without `force`.
    #[error("config already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// Removing `transient` at the end of a run would also remove `other`.
    #[error("transient path {transient} overlaps {other}")]
    TransientOverlap { transient: PathBuf, other: PathBuf },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn config_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
