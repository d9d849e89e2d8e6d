//! packsync — incremental model packaging.
//!
//! # Usage
//!
//! ```text
//! packsync init [<path>] [--force]
//! packsync sync [--root <dir>] [--config <file>] [--device <tag>] [--compiler <program>] [--dry-run] [--json]
//! packsync plan [--root <dir>] [--config <file>] [--json]
//! packsync status [--root <dir>] [--config <file>] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, plan::PlanArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "packsync",
    version,
    about = "Compile and bundle only the models your app does not have yet",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default packsync.yaml into a project directory.
    Init(InitArgs),

    /// Compile new models and merge them into the app config.
    Sync(SyncArgs),

    /// Show which models the next sync would compile.
    Plan(PlanArgs),

    /// Show per-model sync status.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
