//! Snapshot synchronization engine
//!
//! The [`SyncEngine`] runs one sync cycle as a pipeline of named stages:
//!
//! 1. **Bootstrap**: declare and purge the client's notification queue
//! 2. **Load**: read the persisted baseline and scan the sync root
//! 3. **Diff**: merge both into the snapshot to submit (tombstones for deletions)
//! 4. **Submit**: send the snapshot, receive the server's action plan
//! 5. **Execute**: apply the plan, then refresh the baseline
//!
//! Stages 1, 2 (scan) and 4 abort the cycle; nothing has been written to the
//! baseline at that point, so the next run retries from the same state.
//! Failures inside stage 5 are per directive and never abort.

use std::sync::Arc;

use dirsync_core::domain::{reconcile, DirectorySnapshot, SyncActionPlan, SyncContext};
use dirsync_core::ports::{
    IFileTransfer, ILocalFileSystem, IMessageQueue, ISnapshotStore, ISyncServer,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::bootstrap::QueueBootstrap;
use crate::executor::{ActionExecutor, DirectiveOutcome, DirectiveReport, ExecutionReport};
use crate::SyncError;

// ============================================================================
// SyncResult
// ============================================================================

/// Summary of a completed synchronization cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResult {
    /// Stale notifications discarded during bootstrap
    pub purged_messages: u64,
    /// No baseline was available, the current scan was submitted as-is
    pub first_run: bool,
    /// Entries in the submitted snapshot, tombstones included
    pub submitted_entries: usize,
    /// Deletions reported to the server
    pub tombstones: usize,
    /// Directives in the server's plan
    pub planned_actions: usize,
    pub files_uploaded: u32,
    pub files_downloaded: u32,
    pub directories_created: u32,
    pub unknown_actions: u32,
    pub failed_actions: u32,
    /// Per-directive outcomes
    pub directives: Vec<DirectiveReport>,
    /// Errors encountered during the sync (non-fatal)
    pub errors: Vec<String>,
    /// Whether the baseline was replaced by a fresh capture
    pub snapshot_refreshed: bool,
    /// Wall-clock duration of the sync in milliseconds
    pub duration_ms: u64,
}

impl SyncResult {
    fn record_execution(&mut self, report: ExecutionReport) {
        self.files_uploaded = report.count(|o| matches!(o, DirectiveOutcome::Uploaded { .. }));
        self.files_downloaded = report.count(|o| matches!(o, DirectiveOutcome::Downloaded));
        self.directories_created =
            report.count(|o| matches!(o, DirectiveOutcome::DirectoryCreated));
        self.unknown_actions = report.count(|o| matches!(o, DirectiveOutcome::Skipped));
        self.failed_actions = report.count(DirectiveOutcome::is_failure);

        self.errors.extend(report.directives.iter().filter_map(|d| match &d.outcome {
            DirectiveOutcome::Failed { error } => Some(format!("{} {}: {error}", d.action, d.path)),
            _ => None,
        }));
        if let Some(err) = &report.refresh_error {
            self.errors.push(format!("baseline refresh: {err}"));
        }

        self.snapshot_refreshed = report.snapshot_refreshed();
        self.directives = report.directives;
    }
}

/// The snapshot a cycle would submit
#[derive(Debug, Clone, Serialize)]
pub struct PreparedSnapshot {
    /// True when no baseline existed (or it was unreadable)
    pub first_run: bool,
    pub snapshot: DirectorySnapshot,
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Sync cycle orchestrator
///
/// ## Dependencies
///
/// - `message_queue`: notification queue bootstrap
/// - `snapshot_store`: baseline and current metadata
/// - `sync_server`: snapshot submission
/// - `file_transfer` / `local_filesystem`: directive execution
pub struct SyncEngine {
    context: SyncContext,
    bootstrap: QueueBootstrap,
    snapshot_store: Arc<dyn ISnapshotStore + Send + Sync>,
    sync_server: Arc<dyn ISyncServer + Send + Sync>,
    executor: ActionExecutor,
}

impl SyncEngine {
    /// Creates a new `SyncEngine` with the given dependencies
    ///
    /// # Arguments
    /// * `context` - Client identity, sync root and queue name
    /// * `max_concurrent_actions` - Directives applied at once
    pub fn new(
        context: SyncContext,
        message_queue: Arc<dyn IMessageQueue + Send + Sync>,
        snapshot_store: Arc<dyn ISnapshotStore + Send + Sync>,
        sync_server: Arc<dyn ISyncServer + Send + Sync>,
        file_transfer: Arc<dyn IFileTransfer + Send + Sync>,
        local_filesystem: Arc<dyn ILocalFileSystem + Send + Sync>,
        max_concurrent_actions: usize,
    ) -> Self {
        let executor = ActionExecutor::new(
            context.clone(),
            file_transfer,
            local_filesystem,
            snapshot_store.clone(),
            max_concurrent_actions,
        );
        Self {
            context,
            bootstrap: QueueBootstrap::new(message_queue),
            snapshot_store,
            sync_server,
            executor,
        }
    }

    pub fn context(&self) -> &SyncContext {
        &self.context
    }

    /// Runs one full sync cycle
    ///
    /// # Returns
    /// A [`SyncResult`] summarizing the sync cycle
    ///
    /// # Errors
    /// Returns the [`SyncError`] of the stage that aborted the cycle
    #[tracing::instrument(skip(self), fields(client_id = %self.context.client_id()))]
    pub async fn sync(&self) -> Result<SyncResult, SyncError> {
        let start = std::time::Instant::now();
        let mut result = SyncResult::default();

        info!(sync_root = %self.context.sync_root().display(), "Starting sync cycle");

        // Stage 1: bootstrap
        result.purged_messages = self.bootstrap.prepare(self.context.queue_name()).await?;

        // Stages 2 and 3: load + diff
        let prepared = self.plan_snapshot().await?;
        result.first_run = prepared.first_run;
        result.submitted_entries = prepared.snapshot.len();
        result.tombstones = prepared.snapshot.tombstone_count();

        // Stage 4: submit
        let plan = self.submit(&prepared.snapshot).await?;
        result.planned_actions = plan.len();

        // Stage 5: execute
        let report = self.executor.apply(&plan).await;
        result.record_execution(report);

        result.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            uploaded = result.files_uploaded,
            downloaded = result.files_downloaded,
            directories = result.directories_created,
            failed = result.failed_actions,
            duration_ms = result.duration_ms,
            "Sync cycle complete"
        );
        Ok(result)
    }

    /// Loads the baseline and the current scan and merges them
    ///
    /// Touches neither the queue, the server nor the baseline, so it doubles
    /// as a dry run.
    ///
    /// # Errors
    /// Returns [`SyncError::LocalMetadata`] if the sync root cannot be scanned
    #[tracing::instrument(skip(self))]
    pub async fn plan_snapshot(&self) -> Result<PreparedSnapshot, SyncError> {
        let last = match self.snapshot_store.last_snapshot().await {
            Ok(last) => last,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Baseline unreadable, proceeding as first run");
                None
            }
        };

        let current = self
            .snapshot_store
            .local_metadata()
            .await
            .map_err(SyncError::LocalMetadata)?;

        Ok(match last {
            Some(last) => {
                let snapshot = reconcile(&last, &current);
                info!(
                    entries = snapshot.len(),
                    tombstones = snapshot.tombstone_count(),
                    "Snapshot merged with baseline"
                );
                PreparedSnapshot {
                    first_run: false,
                    snapshot,
                }
            }
            None => {
                info!(entries = current.len(), "No baseline, submitting current scan");
                PreparedSnapshot {
                    first_run: true,
                    snapshot: current,
                }
            }
        })
    }

    async fn submit(&self, snapshot: &DirectorySnapshot) -> Result<SyncActionPlan, SyncError> {
        let plan = self
            .sync_server
            .submit_snapshot(self.context.client_id(), snapshot)
            .await
            .map_err(SyncError::Submit)?;

        match plan {
            Some(plan) => {
                info!(directives = plan.len(), "Received action plan");
                Ok(plan)
            }
            None => {
                info!("Server reports nothing to do");
                Ok(SyncActionPlan::new())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
