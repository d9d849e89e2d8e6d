//! # packsync-sync
//!
//! Incremental model synchronization against a compiled app manifest.
//!
//! Call [`pipeline::run`] to plan, compile and merge the models a project
//! does not have yet, or [`status::check`] to inspect where each model stands.

pub mod cleanup;
pub mod compiler;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod reconcile;
pub mod status;

pub use compiler::{Compiler, ExternalCompiler};
pub use error::{CompilerError, SyncError};
pub use pipeline::{run, SyncOutcome, SyncReport};
pub use plan::{plan, WorkOrder};
pub use status::{ModelSignal, ModelStatus};
