//! DirSync Sync - Snapshot synchronization cycle
//!
//! Provides:
//! - The sync cycle pipeline (bootstrap, load, diff, submit, execute)
//! - Per-directive action execution with failure isolation
//! - Notification queue bootstrap
//! - Local filesystem and snapshot store adapters
//!
//! ## Modules
//!
//! - [`engine`] - Sync cycle orchestration and its summary
//! - [`executor`] - Applies a server action plan, then refreshes the baseline
//! - [`bootstrap`] - Declares and purges the client's queue
//! - [`filesystem`] - Local filesystem adapter (scanning, atomic writes, SHA-256)
//! - [`snapshot_store`] - JSON file baseline store

pub mod bootstrap;
pub mod engine;
pub mod executor;
pub mod filesystem;
pub mod snapshot_store;


use thiserror::Error;

/// Errors that abort a sync cycle
///
/// Each variant names the stage that failed. None of them leaves the
/// persisted baseline modified.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The client's queue could not be declared
    #[error("Failed to declare queue: {0:#}")]
    QueueDeclare(anyhow::Error),

    /// Pending notifications could not be purged
    #[error("Failed to purge queue: {0:#}")]
    QueuePurge(anyhow::Error),

    /// The current state of the sync root could not be collected
    #[error("Failed to read local metadata: {0:#}")]
    LocalMetadata(anyhow::Error),

    /// Snapshot submission failed or the response was unusable
    #[error("Failed to submit snapshot: {0:#}")]
    Submit(anyhow::Error),
}

impl SyncError {
    /// Short name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::QueueDeclare(_) | Self::QueuePurge(_) => "bootstrap",
            Self::LocalMetadata(_) => "load",
            Self::Submit(_) => "submit",
        }
    }
}
