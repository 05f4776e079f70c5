//! `todosync scan`: list TODO markers and their identities. With `--write`,
//! also create and refresh their documents and commit them, leaving the
//! tracker alone.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use todosync_core::CodeMarker;
use todosync_sync::{refresh_documents, GitVcs, RefreshOutcome};

use super::load_config;

/// Arguments for `todosync scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Repository root.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Write documents for new or changed markers and commit them.
    #[arg(long)]
    pub write: bool,

    /// With `--write`: report what would be written without touching anything.
    #[arg(long, requires = "write")]
    pub dry_run: bool,
}

#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "identity")]
    identity: String,
    #[tabled(rename = "location")]
    location: String,
    #[tabled(rename = "text")]
    text: String,
}

impl ScanArgs {
    pub fn run(self) -> Result<()> {
        let cfg = load_config(&self.root)?;
        if self.write {
            let vcs = GitVcs::new(&self.root);
            let outcome = refresh_documents(&self.root, &cfg, &vcs, self.dry_run)?;
            if self.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).context("failed to serialize outcome")?
                );
            } else {
                print_refresh(&outcome);
            }
            return Ok(());
        }

        let mut excludes = cfg.exclude.clone();
        excludes.push(cfg.docs_dir.clone());
        let markers = todosync_scanner::scan(&self.root, &excludes)
            .with_context(|| format!("failed to scan {}", self.root.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&markers).context("failed to serialize markers")?
            );
            return Ok(());
        }
        print_table(&markers);
        Ok(())
    }
}

fn print_table(markers: &[CodeMarker]) {
    if markers.is_empty() {
        println!("No TODO markers found.");
        return;
    }
    let rows: Vec<MarkerRow> = markers
        .iter()
        .map(|m| MarkerRow {
            identity: m.identity.to_string(),
            location: format!("{}:{}", m.source_file.display(), m.line),
            text: m.text.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{}", format!("{} marker(s)", markers.len()).bright_black());
}

fn print_refresh(outcome: &RefreshOutcome) {
    let prefix = if outcome.dry_run { "[dry-run] " } else { "" };
    for path in &outcome.documents {
        println!("{prefix}✓ {}", path.display());
    }
    let tally = &outcome.tally;
    println!("{prefix}Scan summary:");
    println!("  TODOs in code: {}", tally.markers);
    println!("  Created:       {}", tally.created);
    println!("  Updated:       {}", tally.updated);
    println!("  Unchanged:     {}", tally.unchanged);
    if outcome.committed {
        println!("✓ committed {} document(s)", tally.changes());
    } else if tally.changes() == 0 {
        println!("{}", "✓ all documents already match the source tree".green());
    }
}
