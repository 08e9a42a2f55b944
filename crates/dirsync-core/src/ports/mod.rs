//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the sync cycle depends
//! on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ISnapshotStore`] - Last-known baseline and live metadata collection
//! - [`ISyncServer`] - Snapshot submission and action plan retrieval
//! - [`IFileTransfer`] - Per-file upload and download
//! - [`ILocalFileSystem`] - Local scanning and directory creation
//! - [`IMessageQueue`] - Notification queue declaration and purge

pub mod file_transfer;
pub mod local_filesystem;
pub mod message_queue;
pub mod snapshot_store;
pub mod sync_server;

pub use file_transfer::{IFileTransfer, UploadReceipt};
pub use local_filesystem::{temp_path_for, ILocalFileSystem, ScanOptions, TEMP_SUFFIX};
pub use message_queue::IMessageQueue;
pub use snapshot_store::ISnapshotStore;
pub use sync_server::{ISyncServer, SubmitSnapshotRequest, SubmitSnapshotResponse};
