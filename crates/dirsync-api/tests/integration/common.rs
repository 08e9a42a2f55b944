//! Shared test helpers for the HTTP adapter integration tests
//!
//! Each helper mounts the necessary mock endpoints on a wiremock server.

use std::path::Path;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirsync_api::client::SyncServerClient;
use dirsync_api::queue::RabbitMqManagementClient;
use dirsync_core::domain::{DirectorySnapshot, FileRecord, NormalizedPath};

/// Starts a mock sync server and returns a client pointing at it whose
/// sync root is `sync_root`.
pub async fn setup_server_mock(sync_root: &Path) -> (MockServer, SyncServerClient) {
    let server = MockServer::start().await;
    let client = SyncServerClient::with_base_url(server.uri(), sync_root.to_path_buf());
    (server, client)
}

/// Starts a mock management API and returns a client authenticating as
/// `guest:guest` on the default vhost.
pub async fn setup_broker_mock() -> (MockServer, RabbitMqManagementClient) {
    let server = MockServer::start().await;
    let address = format!("http://guest:guest@{}", server.address());
    let client = RabbitMqManagementClient::with_base_url(&address, "/")
        .expect("mock server address is a valid URL");
    (server, client)
}

/// Mounts `POST /snapshot` answering with `body`.
pub async fn mount_snapshot_response(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts `GET /download?path=<normalized>` serving `content`.
pub async fn mount_download(server: &MockServer, normalized: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/download"))
        .and(query_param("path", normalized))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Mounts `POST /upload` answering with a receipt for `file_url`.
pub async fn mount_upload(server: &MockServer, file_url: &str) {
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "file_url": file_url
        })))
        .mount(server)
        .await;
}

pub fn sample_snapshot() -> DirectorySnapshot {
    DirectorySnapshot::from_records(vec![
        FileRecord::directory(NormalizedPath::new("docs").unwrap(), None),
        FileRecord::file(
            NormalizedPath::new("docs/a.txt").unwrap(),
            3,
            None,
            Some("ba7816bf".to_string()),
        ),
        FileRecord::file(NormalizedPath::new("old.txt").unwrap(), 1, None, None).into_tombstone(),
    ])
    .unwrap()
}
