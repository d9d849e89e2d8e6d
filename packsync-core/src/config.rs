//! Project configuration: `<root>/packsync.yaml`.
//!
//! # File format
//!
//! ```yaml
//! package_config: mlc-package-config.json
//! app_config: dist/bundle/mlc-app-config.json
//! bundle_dir: dist/bundle
//! work_order: temp_package_config.json
//! output_dir: dist_temp
//! default_device: iphone
//! compiler:
//!   program: mlc_llm
//!   args: [package, --package-config, "{work_order}", -o, "{output_dir}"]
//!   result_manifest: bundle/mlc-app-config.json
//!   asset_dir: bundle
//! ```
//!
//! Every key is optional. Relative paths resolve against the project root,
//! never against the process working directory.
//!
//! `work_order` and `output_dir` are deleted at the end of every run, so
//! neither may equal or contain the root, a canonical manifest, the bundle
//! directory, or each other. [`load_at`] rejects such layouts with
//! [`ConfigError::TransientOverlap`].

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{config_io_err, ConfigError};

pub const CONFIG_FILE: &str = "packsync.yaml";
pub const DEFAULT_DEVICE: &str = "iphone";

/// Placeholder in `compiler.args` replaced by the work-order manifest path.
pub const WORK_ORDER_PLACEHOLDER: &str = "{work_order}";
/// Placeholder in `compiler.args` replaced by the compiler output directory.
pub const OUTPUT_DIR_PLACEHOLDER: &str = "{output_dir}";

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

/// External compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Result manifest, relative to the output directory.
    pub result_manifest: PathBuf,
    /// Directory holding per-model asset trees, relative to the output directory.
    pub asset_dir: PathBuf,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: "mlc_llm".to_string(),
            args: vec![
                "package".to_string(),
                "--package-config".to_string(),
                WORK_ORDER_PLACEHOLDER.to_string(),
                "-o".to_string(),
                OUTPUT_DIR_PLACEHOLDER.to_string(),
            ],
            result_manifest: PathBuf::from("bundle").join("mlc-app-config.json"),
            asset_dir: PathBuf::from("bundle"),
        }
    }
}

/// `packsync.yaml` as written by users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub package_config: PathBuf,
    pub app_config: PathBuf,
    pub bundle_dir: PathBuf,
    pub work_order: PathBuf,
    pub output_dir: PathBuf,
    pub default_device: String,
    pub compiler: CompilerConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            package_config: PathBuf::from("mlc-package-config.json"),
            app_config: PathBuf::from("dist").join("bundle").join("mlc-app-config.json"),
            bundle_dir: PathBuf::from("dist").join("bundle"),
            work_order: PathBuf::from("temp_package_config.json"),
            output_dir: PathBuf::from("dist_temp"),
            default_device: DEFAULT_DEVICE.to_string(),
            compiler: CompilerConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Configuration with every path resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub root: PathBuf,
    /// Desired-state manifest (read-only input).
    pub package_config: PathBuf,
    /// Canonical manifest, rewritten once per run.
    pub app_config: PathBuf,
    /// Canonical asset root.
    pub bundle_dir: PathBuf,
    /// Transient work-order manifest handed to the compiler.
    pub work_order: PathBuf,
    /// Transient compiler output directory.
    pub output_dir: PathBuf,
    pub default_device: String,
    pub compiler: CompilerConfig,
}

impl SyncConfig {
    pub fn from_file(root: &Path, file: ConfigFile) -> Self {
        let resolve = |p: &Path| normalize(&root.join(p));
        Self {
            root: root.to_path_buf(),
            package_config: resolve(&file.package_config),
            app_config: resolve(&file.app_config),
            bundle_dir: resolve(&file.bundle_dir),
            work_order: resolve(&file.work_order),
            output_dir: resolve(&file.output_dir),
            default_device: file.default_device,
            compiler: file.compiler,
        }
    }

    /// Defaults rooted at `root`, ignoring any config file.
    pub fn with_defaults(root: &Path) -> Self {
        Self::from_file(root, ConfigFile::default())
    }

    /// Where the compiler writes its result manifest.
    pub fn result_manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.compiler.result_manifest)
    }

    /// Root of the compiler's per-model asset trees.
    pub fn compiled_asset_root(&self) -> PathBuf {
        self.output_dir.join(&self.compiler.asset_dir)
    }

    /// Paths discarded at the end of every run.
    pub fn transient_paths(&self) -> Vec<PathBuf> {
        vec![self.work_order.clone(), self.output_dir.clone()]
    }

    /// Reject layouts where removing a transient path would take canonical
    /// state (or the other transient path) with it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let canonical = [
            &self.root,
            &self.package_config,
            &self.app_config,
            &self.bundle_dir,
        ];
        for transient in [&self.work_order, &self.output_dir] {
            if let Some(other) = canonical.iter().find(|c| c.starts_with(transient)) {
                return Err(ConfigError::TransientOverlap {
                    transient: transient.clone(),
                    other: other.to_path_buf(),
                });
            }
        }
        if self.work_order.starts_with(&self.output_dir) {
            return Err(ConfigError::TransientOverlap {
                transient: self.output_dir.clone(),
                other: self.work_order.clone(),
            });
        }
        if self.output_dir.starts_with(&self.work_order) {
            return Err(ConfigError::TransientOverlap {
                transient: self.work_order.clone(),
                other: self.output_dir.clone(),
            });
        }
        Ok(())
    }
}

/// Fold `.` and `..` lexically so `dist/../dist_temp` compares like `dist_temp`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Load / write
// ---------------------------------------------------------------------------

/// `<root>/packsync.yaml`
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load configuration for the project at `root`.
///
/// `explicit` overrides the config file location (relative paths resolve
/// against `root`). A missing file yields defaults. Overlapping transient
/// and canonical paths are an error.
pub fn load_at(root: &Path, explicit: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    let path = match explicit {
        Some(p) => root.join(p),
        None => config_path_at(root),
    };
    let file = read_config_file(&path)?;
    let config = SyncConfig::from_file(root, file);
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(ConfigFile::default());
        }
        Err(err) => return Err(config_io_err(path, err)),
    };
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a default `packsync.yaml` under `root`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `rename`.
pub fn write_default_at(root: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = config_path_at(root);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists { path });
    }
    std::fs::create_dir_all(root).map_err(|e| config_io_err(root, e))?;

    let yaml = serde_yaml::to_string(&ConfigFile::default())?;
    let tmp = path.with_file_name(format!("{CONFIG_FILE}.tmp"));
    std::fs::write(&tmp, yaml).map_err(|e| config_io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| config_io_err(&path, e))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
