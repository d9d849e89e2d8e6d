//! `packsync status` — per-model sync visibility.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use packsync_sync::{status::check, ModelSignal, ModelStatus};

use super::ProjectArgs;

/// Arguments for `packsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.project.load()?;
        let statuses = check(&cfg)
            .with_context(|| format!("status check failed for '{}'", cfg.root.display()))?;

        if self.json {
            print_json(&statuses)?;
            return Ok(());
        }
        print_table(&statuses);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusSummaryJson {
    models: usize,
    pending: usize,
    missing_assets: usize,
    orphan: usize,
}

#[derive(Serialize)]
struct StatusReportJson<'a> {
    summary: StatusSummaryJson,
    models: &'a [ModelStatus],
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "model")]
    model: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "bundled")]
    bundled: String,
    #[tabled(rename = "model lib")]
    model_lib: String,
}

fn count(statuses: &[ModelStatus], signal: ModelSignal) -> usize {
    statuses.iter().filter(|s| s.signal == signal).count()
}

fn print_json(statuses: &[ModelStatus]) -> Result<()> {
    let payload = StatusReportJson {
        summary: StatusSummaryJson {
            models: statuses.len(),
            pending: count(statuses, ModelSignal::Pending),
            missing_assets: count(statuses, ModelSignal::MissingAssets),
            orphan: count(statuses, ModelSignal::Orphan),
        },
        models: statuses,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(statuses: &[ModelStatus]) {
    let pending = count(statuses, ModelSignal::Pending);
    println!(
        "packsync v{} | {} models | {} pending | {} missing assets | {} orphan",
        env!("CARGO_PKG_VERSION"),
        statuses.len(),
        pending,
        count(statuses, ModelSignal::MissingAssets),
        count(statuses, ModelSignal::Orphan),
    );

    if statuses.is_empty() {
        println!("No models configured.");
        return;
    }

    let rows: Vec<StatusTableRow> = statuses
        .iter()
        .map(|s| StatusTableRow {
            model: s.model_id.to_string(),
            status: format!("{} {}", signal_indicator(s.signal), s.signal),
            bundled: (if s.bundle_weight { "yes" } else { "no" }).to_string(),
            model_lib: s.model_lib.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if pending > 0 {
        println!("Run 'packsync sync' to compile pending models.");
    }
}

fn signal_indicator(signal: ModelSignal) -> String {
    match signal {
        ModelSignal::Compiled => "■".green().bold().to_string(),
        ModelSignal::Pending => "■".yellow().bold().to_string(),
        ModelSignal::MissingAssets => "■".red().bold().to_string(),
        ModelSignal::Orphan => "■".magenta().bold().to_string(),
    }
}
