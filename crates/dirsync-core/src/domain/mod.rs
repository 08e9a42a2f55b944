//! Domain entities and business logic
//!
//! This module contains the core domain types for DirSync:
//! - Newtypes for validated identifiers and normalized paths
//! - Snapshot types (`FileRecord`, `DirectorySnapshot`)
//! - The diff engine producing tombstoned, merged snapshots
//! - Server-issued action plans
//! - The per-cycle context passed to every component
//! - Domain-specific error types

pub mod context;
pub mod diff;
pub mod errors;
pub mod newtypes;
pub mod plan;
pub mod snapshot;

// Re-export commonly used types
pub use context::SyncContext;
pub use diff::reconcile;
pub use errors::DomainError;
pub use newtypes::*;
pub use plan::{FileActionDirective, SyncAction, SyncActionPlan};
pub use snapshot::{DirectorySnapshot, FileRecord, FileStatus};
