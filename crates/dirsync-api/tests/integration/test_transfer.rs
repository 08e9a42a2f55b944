//! Integration tests for file transfers (upload/download)
//!
//! Verifies end-to-end behavior of uploads and downloads against a
//! wiremock-based sync server.

use dirsync_core::domain::{ClientId, NormalizedPath};
use dirsync_core::ports::IFileTransfer;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::common;

// ============================================================================
// Download tests
// ============================================================================

#[tokio::test]
async fn test_download_writes_under_sync_root() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    let content = b"remote content";
    common::mount_download(&server, "docs/deep/file.txt", content).await;

    client
        .download(&NormalizedPath::new("docs/deep/file.txt").unwrap())
        .await
        .expect("download failed");

    let local = root.path().join("docs/deep/file.txt");
    assert_eq!(std::fs::read(&local).unwrap(), content);
    assert!(!root.path().join("docs/deep/file.txt.tmp").exists());
}

#[tokio::test]
async fn test_download_replaces_existing_file() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("a.txt"), b"stale").unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;
    common::mount_download(&server, "a.txt", b"fresh").await;

    client
        .download(&NormalizedPath::new("a.txt").unwrap())
        .await
        .unwrap();

    assert_eq!(std::fs::read(root.path().join("a.txt")).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_download_large_body_arrives_intact() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    // Several MiB so the body spans many chunks.
    let content: Vec<u8> = (0..6 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    common::mount_download(&server, "big.bin", &content).await;

    client
        .download(&NormalizedPath::new("big.bin").unwrap())
        .await
        .expect("download failed");

    let local = std::fs::read(root.path().join("big.bin")).unwrap();
    assert_eq!(local.len(), content.len());
    assert!(local == content);
    assert!(!root.path().join("big.bin.tmp").exists());
}

#[tokio::test]
async fn test_download_not_found_leaves_disk_untouched() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client
        .download(&NormalizedPath::new("gone.txt").unwrap())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("404"));
    assert!(!root.path().join("gone.txt").exists());
}

// ============================================================================
// Upload tests
// ============================================================================

#[tokio::test]
async fn test_upload_returns_receipt() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("docs")).unwrap();
    let local = root.path().join("docs/report.txt");
    std::fs::write(&local, b"quarterly numbers").unwrap();

    let (server, client) = common::setup_server_mock(root.path()).await;
    common::mount_upload(&server, "http://files.local/docs/report.txt").await;

    let receipt = client
        .upload(&local, &ClientId::new("laptop-01").unwrap())
        .await
        .expect("upload failed");
    assert_eq!(receipt.file_url, "http://files.local/docs/report.txt");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"client_id\""));
    assert!(body.contains("laptop-01"));
    assert!(body.contains("name=\"path\""));
    assert!(body.contains("docs/report.txt"));
    assert!(body.contains("filename=\"report.txt\""));
    assert!(body.contains("quarterly numbers"));
}

#[tokio::test]
async fn test_upload_large_file_sends_whole_content() {
    let root = TempDir::new().unwrap();
    let local = root.path().join("big.bin");
    let content: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 253) as u8).collect();
    std::fs::write(&local, &content).unwrap();

    let (server, client) = common::setup_server_mock(root.path()).await;
    common::mount_upload(&server, "http://files.local/big.bin").await;

    client
        .upload(&local, &ClientId::new("c").unwrap())
        .await
        .expect("upload failed");

    let requests = server.received_requests().await.unwrap();
    let body = &requests[0].body;
    assert!(body.len() > content.len());
    assert!(body.windows(content.len()).any(|w| w == content.as_slice()));
}

#[tokio::test]
async fn test_upload_missing_local_file_fails_without_request() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    let result = client
        .upload(
            &root.path().join("missing.txt"),
            &ClientId::new("c").unwrap(),
        )
        .await;

    assert!(result.is_err());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_outside_sync_root_is_rejected() {
    let root = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let outside = other.path().join("x.txt");
    std::fs::write(&outside, b"x").unwrap();
    let (_server, client) = common::setup_server_mock(root.path()).await;

    let result = client.upload(&outside, &ClientId::new("c").unwrap()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_upload_server_rejection_is_an_error() {
    let root = TempDir::new().unwrap();
    let local = root.path().join("a.txt");
    std::fs::write(&local, b"a").unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let err = client
        .upload(&local, &ClientId::new("c").unwrap())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("413"));
}
