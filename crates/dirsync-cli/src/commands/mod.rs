//! CLI subcommands and the configuration plumbing they share

pub mod config;
pub mod snapshot;
pub mod sync;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dirsync_core::config::{Config, ValidationError};
use dirsync_core::ports::{ILocalFileSystem, ScanOptions};
use dirsync_sync::filesystem::LocalFileSystemAdapter;
use dirsync_sync::snapshot_store::FileSnapshotStore;

/// Loads the configuration file (if present) and applies the environment
/// overlay
///
/// A missing file yields the defaults; a file that exists but does not parse
/// is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path)
            .with_context(|| format!("Failed to parse configuration at {}", path.display()))?
    } else {
        Config::default()
    };
    config.apply_env();
    Ok(config)
}

/// Fails with every validation error whose field starts with one of
/// `sections` (all errors when `sections` is empty)
pub fn require_valid(config: &Config, sections: &[&str]) -> Result<()> {
    let errors: Vec<ValidationError> = config
        .validate()
        .into_iter()
        .filter(|e| sections.is_empty() || sections.iter().any(|s| e.field.starts_with(s)))
        .collect();

    if errors.is_empty() {
        return Ok(());
    }
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    anyhow::bail!("Invalid configuration: {}", messages.join("; "))
}

/// Builds the filesystem-backed snapshot store described by `config`
pub fn snapshot_store(
    config: &Config,
) -> (Arc<dyn ILocalFileSystem + Send + Sync>, Arc<FileSnapshotStore>) {
    let local_fs: Arc<dyn ILocalFileSystem + Send + Sync> = Arc::new(LocalFileSystemAdapter::new());
    let store = Arc::new(FileSnapshotStore::new(
        local_fs.clone(),
        config.sync.root.clone(),
        config.snapshot_path(),
        ScanOptions::new(config.sync.ignore.clone()),
    ));
    (local_fs, store)
}
