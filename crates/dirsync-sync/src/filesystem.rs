//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileSystem`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Atomic writes**: [`write_atomic`] writes to a temp file and renames it
//!   into place to avoid partial writes on crash or power loss.
//! - **SHA-256**: content hashes are lowercase hex SHA-256 digests, streamed
//!   in fixed-size chunks.
//! - **Symlinks** are not followed and not recorded.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use dirsync_core::{
    domain::{DirectorySnapshot, FileRecord, NormalizedPath},
    ports::local_filesystem::{temp_path_for, ILocalFileSystem, ScanOptions},
};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, warn};

const HASH_CHUNK_SIZE: usize = 64 * 1024;

// ============================================================================
// LocalFileSystemAdapter struct
// ============================================================================

/// Adapter that bridges the [`ILocalFileSystem`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from their path arguments. Configuration (e.g. sync root) lives at a
/// higher layer.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Recursively records every entry under `dir` into `records`
    fn walk_directory<'a>(
        &'a self,
        dir: &'a Path,
        root: &'a Path,
        options: &'a ScanOptions,
        records: &'a mut Vec<FileRecord>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send + 'a>>
    {
        Box::pin(async move {
            let mut entries = tokio::fs::read_dir(dir)
                .await
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

            while let Some(entry) = entries.next_entry().await? {
                let entry_path = entry.path();

                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    warn!(path = ?entry_path, "Skipping non UTF-8 file name");
                    continue;
                };
                if options.is_ignored(name) {
                    debug!(path = ?entry_path, "Skipping ignored entry");
                    continue;
                }

                let file_type = entry.file_type().await?;
                if file_type.is_symlink() {
                    debug!(path = ?entry_path, "Skipping symlink");
                    continue;
                }

                let path = match NormalizedPath::from_local(root, &entry_path) {
                    Ok(p) => p,
                    Err(err) => {
                        warn!(path = ?entry_path, %err, "Skipping invalid path");
                        continue;
                    }
                };

                let metadata = entry
                    .metadata()
                    .await
                    .with_context(|| format!("Failed to stat {}", entry_path.display()))?;
                let modified = metadata.modified().ok().and_then(system_time_to_utc);

                if metadata.is_dir() {
                    records.push(FileRecord::directory(path, modified));
                    self.walk_directory(&entry_path, root, options, records)
                        .await?;
                } else if metadata.is_file() {
                    let hash = compute_hash(&entry_path).await?;
                    records.push(FileRecord::file(
                        path,
                        metadata.len(),
                        modified,
                        Some(hash),
                    ));
                }
            }

            Ok(())
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn system_time_to_utc(st: std::time::SystemTime) -> Option<DateTime<Utc>> {
    st.duration_since(std::time::UNIX_EPOCH)
        .ok()
        .and_then(|dur| DateTime::from_timestamp(dur.as_secs() as i64, dur.subsec_nanos()))
}

/// Computes the lowercase hex SHA-256 digest of a file's content
pub async fn compute_hash(path: &Path) -> anyhow::Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {} for hashing", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Writes `data` to `target` through its [`temp_path_for`] sibling and a rename
///
/// Parent directories are created as needed.
pub async fn write_atomic(target: &Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp_path = temp_path_for(target);

    debug!(?tmp_path, "writing to temporary file");
    tokio::fs::write(&tmp_path, data).await?;
    tokio::fs::rename(&tmp_path, target).await?;
    Ok(())
}

// ============================================================================
// ILocalFileSystem implementation
// ============================================================================

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self, options), fields(root = %root.display()))]
    async fn scan(
        &self,
        root: &Path,
        options: &ScanOptions,
    ) -> anyhow::Result<DirectorySnapshot> {
        let metadata = tokio::fs::metadata(root)
            .await
            .with_context(|| format!("Sync root is not accessible: {}", root.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("Sync root is not a directory: {}", root.display());
        }

        let mut records = Vec::new();
        self.walk_directory(root, root, options, &mut records)
            .await?;

        debug!(entries = records.len(), "scan complete");
        Ok(DirectorySnapshot::from_records(records)?)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn create_directory(&self, path: &Path) -> anyhow::Result<()> {
        debug!("creating directory");
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        Ok(())
    }
}

// ============================================================================
// Unit tests
// ============================================================================
