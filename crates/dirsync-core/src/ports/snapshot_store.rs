//! Snapshot store port (driven/secondary port)
//!
//! Owns the client's persisted baseline ("last snapshot") and produces the
//! current view of the sync root.

use crate::domain::snapshot::DirectorySnapshot;

/// Port trait for baseline persistence and metadata collection
#[async_trait::async_trait]
pub trait ISnapshotStore: Send + Sync {
    /// Loads the persisted baseline
    ///
    /// # Returns
    /// `None` when no baseline has been persisted yet (first run)
    ///
    /// # Errors
    /// Returns an error if a baseline exists but cannot be read or decoded
    async fn last_snapshot(&self) -> anyhow::Result<Option<DirectorySnapshot>>;

    /// Collects the current metadata of every path under the sync root
    async fn local_metadata(&self) -> anyhow::Result<DirectorySnapshot>;

    /// Captures the current state and persists it as the new baseline
    ///
    /// # Returns
    /// The snapshot that was persisted
    async fn create_directory_snapshot(&self) -> anyhow::Result<DirectorySnapshot>;
}
