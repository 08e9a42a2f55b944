//! Integration tests for snapshot submission
//!
//! Verifies the request body sent to `POST /snapshot` and how each kind of
//! response is turned into an action plan or an error.

use dirsync_core::domain::{ClientId, NormalizedPath, SyncAction};
use dirsync_core::ports::ISyncServer;
use tempfile::TempDir;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, ResponseTemplate,
};

use crate::common;

fn client_id() -> ClientId {
    ClientId::new("laptop-01").unwrap()
}

#[tokio::test]
async fn test_submit_sends_client_id_and_final_snapshot() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    Mock::given(method("POST"))
        .and(path("/snapshot"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "client_id": "laptop-01",
            "final_snapshot": {
                "files": {
                    "docs": {"path": "docs", "status": "present", "is_directory": true},
                    "docs/a.txt": {"status": "present", "size": 3, "content_hash": "ba7816bf"},
                    "old.txt": {"status": "deleted"}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sync_action_metadata": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan = client
        .submit_snapshot(&client_id(), &common::sample_snapshot())
        .await
        .expect("submit failed");
    assert!(plan.is_none());
}

#[tokio::test]
async fn test_submit_parses_action_plan() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    common::mount_snapshot_response(
        &server,
        serde_json::json!({
            "sync_action_metadata": {
                "files": {
                    "docs/a.txt": {"action": "upload"},
                    "remote.bin": {"action": "download"},
                    "photos": {"action": "mkdir"},
                    "odd": {"action": "symlink"}
                }
            }
        }),
    )
    .await;

    let plan = client
        .submit_snapshot(&client_id(), &common::sample_snapshot())
        .await
        .unwrap()
        .expect("plan expected");

    assert_eq!(plan.len(), 4);
    let action = |p: &str| plan.get(&NormalizedPath::new(p).unwrap()).unwrap().action.clone();
    assert_eq!(action("docs/a.txt"), SyncAction::Upload);
    assert_eq!(action("remote.bin"), SyncAction::Download);
    assert_eq!(action("photos"), SyncAction::Mkdir);
    assert_eq!(action("odd"), SyncAction::Unknown("symlink".to_string()));
}

#[tokio::test]
async fn test_submit_missing_plan_field_is_no_action() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;
    common::mount_snapshot_response(&server, serde_json::json!({})).await;

    let plan = client
        .submit_snapshot(&client_id(), &common::sample_snapshot())
        .await
        .unwrap();
    assert!(plan.is_none());
}

#[tokio::test]
async fn test_submit_undecodable_body_is_an_error() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    Mock::given(method("POST"))
        .and(path("/snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client
        .submit_snapshot(&client_id(), &common::sample_snapshot())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse snapshot response"));
}

#[tokio::test]
async fn test_submit_rejects_plan_with_absolute_path() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;
    common::mount_snapshot_response(
        &server,
        serde_json::json!({
            "sync_action_metadata": {"files": {"/etc/passwd": {"action": "download"}}}
        }),
    )
    .await;

    let result = client
        .submit_snapshot(&client_id(), &common::sample_snapshot())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_submit_server_error_is_an_error() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;

    Mock::given(method("POST"))
        .and(path("/snapshot"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let err = client
        .submit_snapshot(&client_id(), &common::sample_snapshot())
        .await
        .unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("500"), "unexpected error: {msg}");
    assert!(msg.contains("database unavailable"), "unexpected error: {msg}");
}

#[tokio::test]
async fn test_submit_connection_refused_is_an_error() {
    let root = TempDir::new().unwrap();
    let (server, client) = common::setup_server_mock(root.path()).await;
    drop(server);

    let result = client
        .submit_snapshot(&client_id(), &common::sample_snapshot())
        .await;
    assert!(result.is_err());
}
