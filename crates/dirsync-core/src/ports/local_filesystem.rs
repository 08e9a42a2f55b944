//! Local filesystem port (driven/secondary port)
//!
//! This module defines the interface for the local filesystem operations a
//! sync cycle needs: scanning the sync root into a snapshot and creating
//! directories requested by the server.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - `create_directory` behaves like `mkdir -p`: an existing directory is
//!   not an error.

use std::path::{Path, PathBuf};

use crate::domain::snapshot::DirectorySnapshot;

/// Suffix of in-progress files written next to their final destination
pub const TEMP_SUFFIX: &str = ".tmp";

/// Sibling of `target` used for write-then-rename
///
/// Same directory, so the rename stays on one filesystem. Scans never record
/// these files (see [`ScanOptions::is_ignored`]).
pub fn temp_path_for(target: &Path) -> PathBuf {
    let mut p = target.as_os_str().to_owned();
    p.push(TEMP_SUFFIX);
    PathBuf::from(p)
}

/// Options controlling which entries a scan records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Entry names skipped at any depth (directories are not descended)
    pub ignore: Vec<String>,
}

impl ScanOptions {
    pub fn new(ignore: Vec<String>) -> Self {
        Self { ignore }
    }

    /// Returns true if an entry with this file name must be skipped
    ///
    /// Temporary files left behind by atomic writes (`*.tmp`) are always
    /// skipped.
    pub fn is_ignored(&self, name: &str) -> bool {
        name.ends_with(TEMP_SUFFIX) || self.ignore.iter().any(|i| i == name)
    }
}

/// Port trait for local filesystem operations
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Walks `root` and records every file and directory below it
    ///
    /// Files carry size, modification time and a content hash; the root
    /// itself is not part of the snapshot.
    ///
    /// # Errors
    /// Returns an error if the root or any entry cannot be read
    async fn scan(&self, root: &Path, options: &ScanOptions)
        -> anyhow::Result<DirectorySnapshot>;

    /// Creates a directory and all parent directories as needed
    ///
    /// # Arguments
    /// * `path` - Absolute path to the directory to create
    ///
    /// # Errors
    /// Returns an error if the path exists and is not a directory
    async fn create_directory(&self, path: &Path) -> anyhow::Result<()>;
}
