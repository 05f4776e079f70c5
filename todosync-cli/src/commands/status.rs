//! `todosync status`: the plan a sync would execute, read-only.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use todosync_core::{Action, ReconcileState};
use todosync_sync::{pipeline, Plan, PlanItem};

use super::RunArgs;

/// Arguments for `todosync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "item")]
    item: String,
    #[tabled(rename = "C D T")]
    presence: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "document")]
    document: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.run.load_config()?;
        let tracker = self.run.tracker(&cfg);
        let ctx = self.run.context();
        let plan = pipeline::plan_at(&self.run.root, &cfg, &ctx, &tracker)
            .context("failed to build plan")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(&plan);
        Ok(())
    }
}

fn print_table(plan: &Plan) {
    println!(
        "todosync v{} | {} item(s) | {} step(s) pending | {} warning(s)",
        env!("CARGO_PKG_VERSION"),
        plan.items.len(),
        plan.steps.len(),
        plan.warnings.len(),
    );

    if plan.items.is_empty() {
        println!("Nothing tracked yet.");
    } else {
        let rows: Vec<StatusTableRow> = plan.items.iter().map(row).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    for warning in &plan.warnings {
        println!("{} {warning}", "⚠".yellow());
    }
    if !plan.is_noop() {
        println!("Run 'todosync sync' to apply.");
    }
}

fn row(item: &PlanItem) -> StatusTableRow {
    let action = if item.scheduled || item.action == Action::Nothing {
        item.action.to_string()
    } else if item.in_step {
        format!("{} (in step)", item.action)
    } else {
        format!("{} (not triggered)", item.action)
    };
    StatusTableRow {
        item: item.key.to_string(),
        presence: item.state.presence().flags(),
        state: state_label(item.state),
        action,
        document: item.document.clone().unwrap_or_else(|| "-".to_string()),
    }
}

fn state_label(state: ReconcileState) -> String {
    let label = state.to_string();
    match state {
        ReconcileState::Everywhere | ReconcileState::DocAndTicket | ReconcileState::Absent => {
            label.green().to_string()
        }
        ReconcileState::CodeAndTicket => label.red().to_string(),
        ReconcileState::TicketOnly => label.bright_black().to_string(),
        ReconcileState::CodeOnly | ReconcileState::CodeAndDoc | ReconcileState::DocOnly => {
            label.yellow().to_string()
        }
    }
}
