//! Sync server port (driven/secondary port)
//!
//! The server owns the comparison that turns a submitted snapshot into an
//! action plan; to this client it is a black box behind one request.
//!
//! ## Wire format
//!
//! - Request: `{"client_id": "...", "final_snapshot": {"files": {...}}}`
//! - Response: `{"sync_action_metadata": {"files": {...}} | null}`

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::ClientId;
use crate::domain::plan::SyncActionPlan;
use crate::domain::snapshot::DirectorySnapshot;

/// Body of a snapshot submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitSnapshotRequest<'a> {
    pub client_id: &'a ClientId,
    pub final_snapshot: &'a DirectorySnapshot,
}

/// Body of the server's answer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitSnapshotResponse {
    /// `None` (or `null` on the wire) means nothing to do
    #[serde(default)]
    pub sync_action_metadata: Option<SyncActionPlan>,
}

/// Port trait for the sync protocol
#[async_trait::async_trait]
pub trait ISyncServer: Send + Sync {
    /// Submits the merged snapshot and returns the server's plan
    ///
    /// # Returns
    /// `None` when the server reports no corrective action
    ///
    /// # Errors
    /// Transport failures, non-success statuses and undecodable bodies are
    /// all returned as errors
    async fn submit_snapshot(
        &self,
        client_id: &ClientId,
        snapshot: &DirectorySnapshot,
    ) -> anyhow::Result<Option<SyncActionPlan>>;
}
