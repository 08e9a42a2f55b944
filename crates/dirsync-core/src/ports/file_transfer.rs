//! File transfer port (driven/secondary port)
//!
//! Moves file content between the sync root and the server. Paths handed to
//! `upload` are local absolute paths; `download` takes the normalized path
//! and the implementation decides where under the sync root it lands.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::{ClientId, NormalizedPath};

/// Server acknowledgement of a completed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Remote reference to the stored file
    pub file_url: String,
}

/// Port trait for per-file transfers
#[async_trait::async_trait]
pub trait IFileTransfer: Send + Sync {
    /// Uploads a local file on behalf of `client_id`
    ///
    /// # Arguments
    /// * `local_path` - Absolute path of the file under the sync root
    /// * `client_id` - Client performing the upload
    async fn upload(&self, local_path: &Path, client_id: &ClientId)
        -> anyhow::Result<UploadReceipt>;

    /// Downloads the server's copy of `path` into the sync root
    ///
    /// Existing local content is replaced.
    async fn download(&self, path: &NormalizedPath) -> anyhow::Result<()>;
}
