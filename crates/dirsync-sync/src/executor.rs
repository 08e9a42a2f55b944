//! Action executor
//!
//! Applies a [`SyncActionPlan`] one directive per path. Directives are
//! independent: a failure is recorded against its path and never cancels a
//! sibling. Once every directive has been attempted the baseline is
//! refreshed from disk, whatever the individual outcomes were, so the next
//! cycle's diff reflects exactly what is on disk (failed paths stay divergent
//! and get re-planned).

use std::sync::Arc;

use dirsync_core::domain::{NormalizedPath, SyncAction, SyncActionPlan, SyncContext};
use dirsync_core::ports::{IFileTransfer, ILocalFileSystem, ISnapshotStore};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// Outcomes
// ============================================================================

/// Result of applying one directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DirectiveOutcome {
    Uploaded { file_url: String },
    Downloaded,
    DirectoryCreated,
    /// The action value was not understood
    Skipped,
    Failed { error: String },
}

impl DirectiveOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of one directive, tagged with its path and action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveReport {
    pub path: NormalizedPath,
    pub action: SyncAction,
    #[serde(flatten)]
    pub outcome: DirectiveOutcome,
}

/// Everything [`ActionExecutor::apply`] did
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    /// Per-directive outcomes, in path order
    pub directives: Vec<DirectiveReport>,
    /// Number of entries in the refreshed baseline, if the refresh succeeded
    pub baseline_entries: Option<usize>,
    /// Why the baseline refresh failed, if it did
    pub refresh_error: Option<String>,
}

impl ExecutionReport {
    /// Number of directives whose outcome matches `predicate`
    pub fn count(&self, predicate: impl Fn(&DirectiveOutcome) -> bool) -> u32 {
        self.directives
            .iter()
            .filter(|d| predicate(&d.outcome))
            .count() as u32
    }

    pub fn failures(&self) -> impl Iterator<Item = &DirectiveReport> {
        self.directives.iter().filter(|d| d.outcome.is_failure())
    }

    pub fn snapshot_refreshed(&self) -> bool {
        self.baseline_entries.is_some()
    }
}

// ============================================================================
// ActionExecutor
// ============================================================================

/// Dispatches plan directives to the transfer and filesystem ports
///
/// ## Dependencies
///
/// - `file_transfer`: upload and download
/// - `local_filesystem`: directory creation
/// - `snapshot_store`: baseline refresh after the plan
pub struct ActionExecutor {
    context: SyncContext,
    file_transfer: Arc<dyn IFileTransfer + Send + Sync>,
    local_filesystem: Arc<dyn ILocalFileSystem + Send + Sync>,
    snapshot_store: Arc<dyn ISnapshotStore + Send + Sync>,
    /// Directives in flight at once
    max_concurrent: usize,
}

impl ActionExecutor {
    pub fn new(
        context: SyncContext,
        file_transfer: Arc<dyn IFileTransfer + Send + Sync>,
        local_filesystem: Arc<dyn ILocalFileSystem + Send + Sync>,
        snapshot_store: Arc<dyn ISnapshotStore + Send + Sync>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            context,
            file_transfer,
            local_filesystem,
            snapshot_store,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Applies every directive of `plan`, then refreshes the baseline
    ///
    /// Never fails: per-directive errors and a failed refresh are reported
    /// in the returned [`ExecutionReport`].
    #[tracing::instrument(skip(self, plan), fields(directives = plan.len()))]
    pub async fn apply(&self, plan: &SyncActionPlan) -> ExecutionReport {
        let mut directives: Vec<DirectiveReport> = stream::iter(plan.iter())
            .map(|(path, directive)| async move {
                let outcome = self.execute_directive(path, &directive.action).await;
                DirectiveReport {
                    path: path.clone(),
                    action: directive.action.clone(),
                    outcome,
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;
        directives.sort_by(|a, b| a.path.cmp(&b.path));

        // Barrier: every directive has been attempted at this point.
        let mut report = ExecutionReport {
            directives,
            ..Default::default()
        };
        match self.snapshot_store.create_directory_snapshot().await {
            Ok(snapshot) => {
                debug!(entries = snapshot.len(), "baseline refreshed");
                report.baseline_entries = Some(snapshot.len());
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Failed to refresh baseline");
                report.refresh_error = Some(format!("{e:#}"));
            }
        }
        report
    }

    async fn execute_directive(&self, path: &NormalizedPath, action: &SyncAction) -> DirectiveOutcome {
        let result = match action {
            SyncAction::Upload => {
                let local = self.context.resolve(path);
                self.file_transfer
                    .upload(&local, self.context.client_id())
                    .await
                    .map(|receipt| DirectiveOutcome::Uploaded {
                        file_url: receipt.file_url,
                    })
            }
            SyncAction::Download => self
                .file_transfer
                .download(path)
                .await
                .map(|()| DirectiveOutcome::Downloaded),
            SyncAction::Mkdir => {
                let local = self.context.resolve(path);
                self.local_filesystem
                    .create_directory(&local)
                    .await
                    .map(|()| DirectiveOutcome::DirectoryCreated)
            }
            SyncAction::Unknown(raw) => {
                warn!(path = %path, action = %raw, "Unknown action, skipping");
                return DirectiveOutcome::Skipped;
            }
        };

        match result {
            Ok(outcome) => {
                match &outcome {
                    DirectiveOutcome::Uploaded { file_url } => {
                        info!(path = %path, %file_url, "Uploaded");
                    }
                    _ => info!(path = %path, %action, "Applied"),
                }
                outcome
            }
            Err(e) => {
                let error = format!("{e:#}");
                warn!(path = %path, %action, %error, "Directive failed, will be re-planned next cycle");
                DirectiveOutcome::Failed { error }
            }
        }
    }
}
