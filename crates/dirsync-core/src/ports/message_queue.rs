//! Message queue port (driven/secondary port)
//!
//! Each client owns one notification queue. Before a sync cycle the queue is
//! declared and emptied so that notifications queued while the client was
//! offline are never mistaken for live signals.

/// Port trait for the client's notification queue
#[async_trait::async_trait]
pub trait IMessageQueue: Send + Sync {
    /// Declares the queue if it does not exist (durable, not auto-deleted)
    ///
    /// Declaring an existing queue with the same properties is a no-op.
    async fn declare_queue(&self, name: &str) -> anyhow::Result<()>;

    /// Removes every pending message from the queue
    ///
    /// # Returns
    /// The number of messages that were discarded
    async fn purge_queue(&self, name: &str) -> anyhow::Result<u64>;
}
