//! DirSync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `FileRecord`, `DirectorySnapshot`, `SyncActionPlan`, `SyncContext`
//! - **Diff engine** - `reconcile`, which merges the last and current snapshots
//!   into the snapshot submitted to the server
//! - **Port definitions** - Traits for adapters: `ISnapshotStore`, `ISyncServer`,
//!   `IFileTransfer`, `ILocalFileSystem`, `IMessageQueue`
//! - **Configuration** - YAML file plus environment overlay
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.

pub mod config;
pub mod domain;
pub mod ports;
