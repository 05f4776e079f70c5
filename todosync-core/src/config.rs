//! Repository configuration.
//!
//! # Storage layout
//!
//! ```text
//! <repo root>/
//!   .todosync.yaml   (optional; defaults apply when absent)
//! ```
//!
//! Every function takes the repository root explicitly so tests can point it
//! at a `TempDir`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// Config file name, relative to the repository root.
pub const CONFIG_FILE: &str = ".todosync.yaml";

/// Default documents directory, relative to the repository root.
pub const DEFAULT_DOCS_DIR: &str = ".github/issues";

/// Default message for the single commit a run makes.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Sync issues: create docs and add issue numbers";

/// Settings read from `.todosync.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracker repository, `owner/name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Documents directory, relative to the repository root.
    pub docs_dir: PathBuf,
    /// Extra repository-relative paths the scanner skips.
    pub exclude: Vec<PathBuf>,
    pub commit_message: String,
    /// Push after committing.
    pub push: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: None,
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            exclude: Vec::new(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            push: true,
        }
    }
}

/// `<root>/.todosync.yaml`: pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load the config for the repository at `root`.
///
/// A missing file yields [`Config::default`]; malformed YAML yields
/// [`ConfigError::Parse`] with the file path.
pub fn load_at(root: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(root);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Atomically save `config` to `<root>/.todosync.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `rename`.
pub fn save_at(root: &Path, config: &Config) -> Result<(), ConfigError> {
    let path = config_path_at(root);
    let tmp = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}

/// Write a default config unless one exists. Returns the effective config.
pub fn init_at(root: &Path, repository: Option<String>, docs_dir: Option<PathBuf>) -> Result<Config, ConfigError> {
    if config_path_at(root).exists() {
        return load_at(root);
    }
    let mut config = Config::default();
    config.repository = repository;
    if let Some(dir) = docs_dir {
        config.docs_dir = dir;
    }
    save_at(root, &config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let root = TempDir::new().expect("tempdir");
        let config = load_at(root.path()).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.docs_dir, PathBuf::from(".github/issues"));
        assert!(config.push);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let root = TempDir::new().expect("tempdir");
        std::fs::write(config_path_at(root.path()), "repository: acme/widgets\n").expect("write");
        let config = load_at(root.path()).expect("load");
        assert_eq!(config.repository.as_deref(), Some("acme/widgets"));
        assert_eq!(config.commit_message, DEFAULT_COMMIT_MESSAGE);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let root = TempDir::new().expect("tempdir");
        let config = Config {
            repository: Some("acme/widgets".to_string()),
            docs_dir: PathBuf::from("docs/issues"),
            exclude: vec![PathBuf::from("vendor")],
            commit_message: "chore: sync".to_string(),
            push: false,
        };
        save_at(root.path(), &config).expect("save");
        assert_eq!(load_at(root.path()).expect("load"), config);
        assert!(!root.path().join(".todosync.yaml.tmp").exists());
    }

    #[test]
    fn init_is_idempotent() {
        let root = TempDir::new().expect("tempdir");
        let first = init_at(root.path(), Some("acme/one".to_string()), None).expect("init");
        let second = init_at(root.path(), Some("acme/two".to_string()), None).expect("init again");
        assert_eq!(first, second);
        assert_eq!(second.repository.as_deref(), Some("acme/one"));
    }
}
