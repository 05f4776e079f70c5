pub mod init;
pub mod scan;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use todosync_core::{config, Config, RunContext, Trigger};
use todosync_sync::GhTracker;

/// Repository and run-context arguments shared by `status` and `sync`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Repository root.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Tracker repository, `owner/name`. Falls back to the config file, then
    /// to whatever `gh` infers from the checkout.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// What triggered this run: `push` or `manual`.
    #[arg(long, env = "EVENT_TYPE", default_value = "push")]
    pub event: Trigger,

    /// Newline-separated paths changed by the triggering push.
    #[arg(long, env = "CHANGED_FILES")]
    pub changed_files: Option<String>,
}

impl RunArgs {
    pub fn load_config(&self) -> Result<Config> {
        load_config(&self.root)
    }

    pub fn context(&self) -> RunContext {
        let changed_files = self
            .changed_files
            .as_deref()
            .and_then(RunContext::parse_changed_files);
        RunContext {
            trigger: self.event,
            changed_files,
        }
    }

    pub fn tracker(&self, config: &Config) -> GhTracker {
        let repo = self.repo.clone().or_else(|| config.repository.clone());
        GhTracker::new(&self.root, repo)
    }
}

pub fn load_config(root: &Path) -> Result<Config> {
    config::load_at(root).with_context(|| {
        format!(
            "failed to load {}",
            config::config_path_at(root).display()
        )
    })
}
