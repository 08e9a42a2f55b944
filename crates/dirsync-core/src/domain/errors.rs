//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! such as path normalization failures and invalid identifiers.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Path is not within the configured sync root
    #[error("Path not within sync root: {0}")]
    PathNotInSyncRoot(String),

    /// Client identifier is empty or malformed
    #[error("Invalid client ID: {0}")]
    InvalidClientId(String),

    /// Two records normalize to the same path
    #[error("Duplicate path in snapshot: {0}")]
    DuplicatePath(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
