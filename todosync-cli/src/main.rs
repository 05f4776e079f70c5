//! todosync: keep TODO markers, work documents and tracker tickets in step.
//!
//! # Usage
//!
//! ```text
//! todosync init   [--root <dir>] [--repo owner/name] [--docs-dir <dir>]
//! todosync scan   [--root <dir>] [--json] [--write [--dry-run]]
//! todosync status [--root <dir>] [--repo ..] [--event push|manual] [--changed-files ..] [--json]
//! todosync sync   [--root <dir>] [--repo ..] [--event push|manual] [--changed-files ..] [--dry-run] [--no-push]
//! ```
//!
//! Exit codes: 0 success, 2 tracker not authenticated, 3 tracker failure,
//! 4 version-control failure, 1 anything else.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{init::InitArgs, scan::ScanArgs, status::StatusArgs, sync::SyncArgs};
use todosync_sync::SyncError;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "todosync",
    version,
    about = "Reconcile TODO comments, work documents and tracker tickets",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write `.todosync.yaml` and create the documents directory.
    Init(InitArgs),

    /// List TODO markers in the source tree.
    Scan(ScanArgs),

    /// Show what a sync would do, without changing anything.
    Status(StatusArgs),

    /// Reconcile markers, documents and tickets, then commit.
    Sync(SyncArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Scan(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Sync(args) => args.run(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Distinct code per failure class; see the module docs.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<SyncError>())
        .map_or(1, |sync| sync.exit_code() as u8)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
