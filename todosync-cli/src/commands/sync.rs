//! `todosync sync`: one full reconciliation run.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use todosync_sync::{pipeline, GitVcs, RunOptions, Tally};

use super::RunArgs;

/// Arguments for `todosync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Show what would change without touching documents, tickets or git.
    #[arg(long)]
    pub dry_run: bool,

    /// Commit but do not push.
    #[arg(long)]
    pub no_push: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.run.load_config()?;
        let tracker = self.run.tracker(&cfg);
        let vcs = GitVcs::new(&self.run.root);
        let ctx = self.run.context();
        let options = RunOptions {
            dry_run: self.dry_run,
            push: !self.no_push,
        };

        let mut tally = Tally::default();
        let result = pipeline::run(&self.run.root, &cfg, &ctx, &tracker, &vcs, options, &mut tally);

        // The tally goes out even when the run failed part-way.
        print_tally(&tally, self.dry_run);
        let outcome = result?;

        if outcome.dry_run {
            for step in &outcome.plan.steps {
                println!("[dry-run] {step}");
            }
            if outcome.plan.is_noop() {
                println!("[dry-run] ✓ nothing to do");
            }
        } else if outcome.committed {
            let pushed = if outcome.pushed { " and pushed" } else { "" };
            println!("✓ committed {} path(s){pushed}", outcome.staged.len());
        } else {
            println!("✓ nothing to commit");
        }
        Ok(())
    }
}

fn print_tally(tally: &Tally, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!("{prefix}Sync summary:");
    println!("  Documents created: {}", tally.documents_created);
    println!("  Tickets created:   {}", tally.created);
    println!("  Tickets updated:   {}", tally.updated);
    println!("  Tickets closed:    {}", tally.closed);
    println!("  Renamed:           {}", tally.renamed);
    if !tally.warnings.is_empty() {
        println!("{}", format!("Warnings ({}):", tally.warnings.len()).yellow());
        for warning in &tally.warnings {
            println!("  {} {warning}", "⚠".yellow());
        }
    }
}
