//! Notification queue bootstrap
//!
//! Runs before every cycle: declares the client's queue (durable, not
//! auto-deleted) and discards anything queued while the client was offline.
//! The snapshot diff is the source of truth for the cycle that follows, so
//! stale notifications must never be read as live ones.

use std::sync::Arc;

use dirsync_core::ports::message_queue::IMessageQueue;
use tracing::{debug, info};

use crate::SyncError;

/// Prepares the client's notification queue
pub struct QueueBootstrap {
    message_queue: Arc<dyn IMessageQueue + Send + Sync>,
}

impl QueueBootstrap {
    pub fn new(message_queue: Arc<dyn IMessageQueue + Send + Sync>) -> Self {
        Self { message_queue }
    }

    /// Declares and purges `queue_name`
    ///
    /// # Returns
    /// The number of stale messages discarded
    ///
    /// # Errors
    /// Both a declare failure and a purge failure are fatal to the cycle
    #[tracing::instrument(skip(self))]
    pub async fn prepare(&self, queue_name: &str) -> Result<u64, SyncError> {
        self.message_queue
            .declare_queue(queue_name)
            .await
            .map_err(SyncError::QueueDeclare)?;
        debug!("queue declared");

        let purged = self
            .message_queue
            .purge_queue(queue_name)
            .await
            .map_err(SyncError::QueuePurge)?;

        if purged > 0 {
            info!(purged, "Discarded stale notifications");
        }
        Ok(purged)
    }
}
