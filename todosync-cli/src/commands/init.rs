//! `todosync init`: write the config file and the documents directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use todosync_core::{config, filename};

/// Arguments for `todosync init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Repository root.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Tracker repository, `owner/name`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// Documents directory, relative to the root.
    #[arg(long)]
    pub docs_dir: Option<PathBuf>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let existed = config::config_path_at(&self.root).exists();
        let cfg = config::init_at(&self.root, self.repo, self.docs_dir)
            .context("failed to initialise todosync")?;

        let docs = self.root.join(&cfg.docs_dir);
        let inherited = code_origin_documents(&docs);
        fs::create_dir_all(&docs)
            .with_context(|| format!("failed to create {}", docs.display()))?;

        if existed {
            println!("✓ {} already present; left unchanged", config::CONFIG_FILE);
        } else {
            println!("✓ wrote {}", config::CONFIG_FILE);
        }
        println!("  documents: {}", cfg.docs_dir.display());
        if let Some(repo) = &cfg.repository {
            println!("  repository: {repo}");
        }
        if inherited > 0 {
            println!(
                "  note: {inherited} code-origin document(s) already present. Identities are the \
                 first 12 hex digits of SHA-256(\"file:line:text\"); documents named with any \
                 other fingerprint will not match their TODO and get regenerated on the next sync. \
                 Remove or rename them before the first sync."
            );
        }
        Ok(())
    }
}

/// Documents in `dir` whose name carries a `todo-<identity>` token.
fn code_origin_documents(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| filename::decode(&e.file_name().to_string_lossy()).identity.is_some())
        .count()
}
