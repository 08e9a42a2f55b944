//! Per-cycle context
//!
//! Identity and location values every component of a sync cycle needs. Built
//! once from configuration and passed explicitly.

use std::path::{Path, PathBuf};

use super::errors::DomainError;
use super::newtypes::{ClientId, NormalizedPath};
use crate::config::Config;

/// Values shared by all stages of a sync cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    client_id: ClientId,
    sync_root: PathBuf,
    queue_name: String,
}

impl SyncContext {
    /// Creates a new context
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if `sync_root` is not absolute and
    /// `DomainError::ValidationFailed` if `queue_name` is empty
    pub fn new(
        client_id: ClientId,
        sync_root: PathBuf,
        queue_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !sync_root.is_absolute() {
            return Err(DomainError::InvalidPath(format!(
                "Sync root must be absolute: {}",
                sync_root.display()
            )));
        }
        let queue_name = queue_name.into();
        if queue_name.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "queue name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            client_id,
            sync_root,
            queue_name,
        })
    }

    /// Builds the context from a loaded configuration
    ///
    /// # Errors
    /// Returns an error if the client ID, sync root or queue name is invalid
    pub fn from_config(config: &Config) -> Result<Self, DomainError> {
        let client_id = ClientId::new(config.client.id.clone())?;
        Self::new(client_id, config.sync.root.clone(), config.queue.name.clone())
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn sync_root(&self) -> &Path {
        &self.sync_root
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Resolves a normalized path to its local absolute path
    pub fn resolve(&self, path: &NormalizedPath) -> PathBuf {
        path.to_local(&self.sync_root)
    }

    /// Normalizes a local absolute path under the sync root
    ///
    /// # Errors
    /// Returns an error if `local` is outside the sync root
    pub fn normalize(&self, local: &Path) -> Result<NormalizedPath, DomainError> {
        NormalizedPath::from_local(&self.sync_root, local)
    }
}
