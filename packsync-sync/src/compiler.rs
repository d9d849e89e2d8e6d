//! External compiler boundary.
//!
//! The compiler is an opaque, blocking batch process: it reads a work-order
//! manifest and writes a result manifest plus per-model asset trees under an
//! output directory. Success is the exit status plus the presence of the
//! result manifest; there is no partial success.

use std::path::{Path, PathBuf};
use std::process::Command;

use packsync_core::{
    config::{CompilerConfig, OUTPUT_DIR_PLACEHOLDER, WORK_ORDER_PLACEHOLDER},
    manifest, Manifest, ManifestError,
};

use crate::error::{CompilerError, SyncError};

/// Anything that can turn a work-order file into compiler output.
pub trait Compiler {
    fn compile(&self, work_order: &Path, output_dir: &Path) -> Result<(), CompilerError>;
}

/// Runs the configured compiler program as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCompiler {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child; the project root.
    pub working_dir: PathBuf,
}

impl ExternalCompiler {
    pub fn from_config(config: &CompilerConfig, working_dir: &Path) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Arguments with `{work_order}` / `{output_dir}` substituted.
    pub fn render_args(&self, work_order: &Path, output_dir: &Path) -> Vec<String> {
        let work_order = work_order.display().to_string();
        let output_dir = output_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(WORK_ORDER_PLACEHOLDER, &work_order)
                    .replace(OUTPUT_DIR_PLACEHOLDER, &output_dir)
            })
            .collect()
    }
}

impl Compiler for ExternalCompiler {
    fn compile(&self, work_order: &Path, output_dir: &Path) -> Result<(), CompilerError> {
        let args = self.render_args(work_order, output_dir);
        tracing::info!("running compiler: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|source| CompilerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!("[compiler] {line}");
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(CompilerError::Failed {
            program: self.program.clone(),
            status: output.status.to_string(),
            stderr,
        })
    }
}

/// Run `compiler` against the work order and load its result manifest.
///
/// `output_dir` is expected to be absent; see [`clear_stale_output`].
pub fn invoke(
    compiler: &dyn Compiler,
    work_order: &Path,
    output_dir: &Path,
    result_manifest: &Path,
) -> Result<Manifest, SyncError> {
    compiler.compile(work_order, output_dir)?;

    match manifest::load_required_at(result_manifest) {
        Ok(result) => {
            tracing::info!(
                "compiler produced {} model(s) in {}",
                result.model_list.len(),
                output_dir.display()
            );
            Ok(result)
        }
        Err(ManifestError::NotFound { path }) => Err(CompilerError::MissingOutput { path }.into()),
        Err(err) => Err(err.into()),
    }
}
