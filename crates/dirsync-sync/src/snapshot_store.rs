//! File-backed snapshot store
//!
//! Implements [`ISnapshotStore`] by persisting the baseline as a JSON document
//! and delegating metadata collection to an [`ILocalFileSystem`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use dirsync_core::{
    domain::DirectorySnapshot,
    ports::{
        local_filesystem::{ILocalFileSystem, ScanOptions},
        snapshot_store::ISnapshotStore,
    },
};
use tracing::{debug, info, instrument};

use crate::filesystem::write_atomic;

/// Snapshot store keeping the baseline in a single JSON file
pub struct FileSnapshotStore {
    local_filesystem: Arc<dyn ILocalFileSystem + Send + Sync>,
    sync_root: PathBuf,
    snapshot_path: PathBuf,
    scan_options: ScanOptions,
}

impl FileSnapshotStore {
    /// Creates a store for `sync_root` persisting to `snapshot_path`
    pub fn new(
        local_filesystem: Arc<dyn ILocalFileSystem + Send + Sync>,
        sync_root: PathBuf,
        snapshot_path: PathBuf,
        scan_options: ScanOptions,
    ) -> Self {
        Self {
            local_filesystem,
            sync_root,
            snapshot_path,
            scan_options,
        }
    }

    /// Location of the persisted baseline
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

#[async_trait::async_trait]
impl ISnapshotStore for FileSnapshotStore {
    #[instrument(skip(self), fields(path = %self.snapshot_path.display()))]
    async fn last_snapshot(&self) -> anyhow::Result<Option<DirectorySnapshot>> {
        let content = match tokio::fs::read(&self.snapshot_path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no baseline persisted yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read {}", self.snapshot_path.display())
                })
            }
        };

        let snapshot: DirectorySnapshot = serde_json::from_slice(&content)
            .with_context(|| format!("Corrupt baseline at {}", self.snapshot_path.display()))?;
        debug!(entries = snapshot.len(), "baseline loaded");
        Ok(Some(snapshot))
    }

    async fn local_metadata(&self) -> anyhow::Result<DirectorySnapshot> {
        self.local_filesystem
            .scan(&self.sync_root, &self.scan_options)
            .await
    }

    #[instrument(skip(self), fields(path = %self.snapshot_path.display()))]
    async fn create_directory_snapshot(&self) -> anyhow::Result<DirectorySnapshot> {
        let snapshot = self.local_metadata().await?;
        let data = serde_json::to_vec_pretty(&snapshot)?;
        write_atomic(&self.snapshot_path, &data)
            .await
            .context("Failed to persist baseline")?;
        info!(entries = snapshot.len(), "baseline persisted");
        Ok(snapshot)
    }
}
