//! Sync server HTTP client
//!
//! Implements [`ISyncServer`] and [`IFileTransfer`] against the sync server:
//!
//! | operation | request |
//! |---|---|
//! | submit snapshot | `POST /snapshot` with `{client_id, final_snapshot}` |
//! | upload | `POST /upload`, multipart fields `client_id`, `path`, `file` (streamed from disk) |
//! | download | `GET /download?path=<normalized path>`, streamed to a temp file then renamed |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::{path::PathBuf, time::Duration};
//! use dirsync_api::client::SyncServerClient;
//!
//! # fn example() -> anyhow::Result<()> {
//! let client = SyncServerClient::new(
//!     "http://localhost:8080",
//!     PathBuf::from("/home/me/Sync"),
//!     Duration::from_secs(30),
//! )?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirsync_core::{
    domain::{ClientId, DirectorySnapshot, NormalizedPath, SyncActionPlan},
    ports::{
        file_transfer::{IFileTransfer, UploadReceipt},
        local_filesystem::temp_path_for,
        sync_server::{ISyncServer, SubmitSnapshotRequest, SubmitSnapshotResponse},
    },
};
use futures_util::StreamExt;
use reqwest::{
    multipart::{Form, Part},
    Body, Client, Method, RequestBuilder, Response,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::{ensure_success, ApiError};

// ============================================================================
// SyncServerClient
// ============================================================================

/// HTTP client for the sync server
///
/// Holds the sync root so that downloads, which are addressed by normalized
/// path, can be written to their local destination.
#[derive(Debug, Clone)]
pub struct SyncServerClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without trailing slash
    base_url: String,
    /// Local directory downloads are written into
    sync_root: PathBuf,
}

impl SyncServerClient {
    /// Creates a client whose requests time out after `timeout`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        base_url: impl Into<String>,
        sync_root: PathBuf,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, base_url, sync_root))
    }

    /// Creates a client with default HTTP settings (useful for testing)
    pub fn with_base_url(base_url: impl Into<String>, sync_root: PathBuf) -> Self {
        Self::with_client(Client::new(), base_url, sync_root)
    }

    fn with_client(client: Client, base_url: impl Into<String>, sync_root: PathBuf) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            sync_root,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a request builder for the given method and path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to base URL (e.g., "/snapshot")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }
}

// ============================================================================
// ISyncServer
// ============================================================================

#[async_trait::async_trait]
impl ISyncServer for SyncServerClient {
    #[instrument(skip(self, snapshot), fields(entries = snapshot.len()))]
    async fn submit_snapshot(
        &self,
        client_id: &ClientId,
        snapshot: &DirectorySnapshot,
    ) -> Result<Option<SyncActionPlan>> {
        let payload = SubmitSnapshotRequest {
            client_id,
            final_snapshot: snapshot,
        };

        let response = self
            .request(Method::POST, "/snapshot")
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send snapshot")?;
        let response = ensure_success(response, "POST /snapshot").await?;

        let body = response
            .bytes()
            .await
            .map_err(ApiError::from)
            .context("Failed to read snapshot response body")?;
        let parsed: SubmitSnapshotResponse = serde_json::from_slice(&body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .context("Failed to parse snapshot response")?;

        debug!(
            directives = parsed.sync_action_metadata.as_ref().map_or(0, |p| p.len()),
            "snapshot accepted"
        );
        Ok(parsed.sync_action_metadata)
    }
}

// ============================================================================
// IFileTransfer
// ============================================================================

#[async_trait::async_trait]
impl IFileTransfer for SyncServerClient {
    #[instrument(skip(self), fields(path = %local_path.display()))]
    async fn upload(&self, local_path: &Path, client_id: &ClientId) -> Result<UploadReceipt> {
        let normalized = NormalizedPath::from_local(&self.sync_root, local_path)?;
        let file = tokio::fs::File::open(local_path)
            .await
            .with_context(|| format!("Failed to open {}", local_path.display()))?;
        let size = file
            .metadata()
            .await
            .with_context(|| format!("Failed to stat {}", local_path.display()))?
            .len();

        // Streamed from disk; the length lets the part carry a Content-Length.
        let form = Form::new()
            .text("client_id", client_id.to_string())
            .text("path", normalized.to_string())
            .part(
                "file",
                Part::stream_with_length(Body::from(file), size)
                    .file_name(normalized.file_name().to_string()),
            );

        let response = self
            .request(Method::POST, "/upload")
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send upload request")?;
        let response = ensure_success(response, "POST /upload").await?;

        let receipt: UploadReceipt = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .context("Failed to parse upload response")?;

        debug!(bytes = size, file_url = %receipt.file_url, "upload complete");
        Ok(receipt)
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn download(&self, path: &NormalizedPath) -> Result<()> {
        let response = self
            .request(Method::GET, "/download")
            .query(&[("path", path.as_str())])
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send download request")?;
        let response = ensure_success(response, "GET /download").await?;

        let target = path.to_local(&self.sync_root);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = temp_path_for(&target);
        let written = match stream_to_file(response, &tmp_path).await {
            Ok(written) => written,
            Err(e) => {
                // Leave nothing half-written behind.
                let _ = tokio::fs::remove_file(&tmp_path).await;
                return Err(e);
            }
        };
        tokio::fs::rename(&tmp_path, &target)
            .await
            .with_context(|| format!("Failed to move download into {}", target.display()))?;

        debug!(bytes = written, "download complete");
        Ok(())
    }
}

/// Writes the response body to `path` chunk by chunk, returning the byte count
async fn stream_to_file(response: Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut written = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk
            .map_err(ApiError::from)
            .context("Failed to read download response body")?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
