//! Integration tests for the RabbitMQ management API client
//!
//! Verifies queue declaration and purge requests, including vhost encoding
//! and basic auth.

use dirsync_core::ports::IMessageQueue;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, ResponseTemplate,
};

use crate::common;

/// `guest:guest`, base64-encoded
const GUEST_AUTH: &str = "Basic Z3Vlc3Q6Z3Vlc3Q=";

#[tokio::test]
async fn test_declare_queue_is_durable() {
    let (server, client) = common::setup_broker_mock().await;

    Mock::given(method("PUT"))
        .and(path("/api/queues/%2F/client-1"))
        .and(header("authorization", GUEST_AUTH))
        .and(body_json(serde_json::json!({
            "durable": true,
            "auto_delete": false,
            "arguments": {}
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client.declare_queue("client-1").await.expect("declare failed");
}

#[tokio::test]
async fn test_declare_existing_queue_succeeds() {
    let (server, client) = common::setup_broker_mock().await;

    Mock::given(method("PUT"))
        .and(path("/api/queues/%2F/client-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert!(client.declare_queue("client-1").await.is_ok());
}

#[tokio::test]
async fn test_declare_rejected_is_an_error() {
    let (server, client) = common::setup_broker_mock().await;

    Mock::given(method("PUT"))
        .and(path("/api/queues/%2F/client-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "not_authorised",
            "reason": "Login failed"
        })))
        .mount(&server)
        .await;

    let err = client.declare_queue("client-1").await.unwrap_err();
    assert!(format!("{err:#}").contains("Unauthorized"));
}

#[tokio::test]
async fn test_purge_returns_pending_count() {
    let (server, client) = common::setup_broker_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/queues/%2F/client-1"))
        .and(header("authorization", GUEST_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "client-1",
            "vhost": "/",
            "durable": true,
            "messages": 12,
            "messages_ready": 12
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/queues/%2F/client-1/contents"))
        .and(header("authorization", GUEST_AUTH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.purge_queue("client-1").await.unwrap(), 12);
}

#[tokio::test]
async fn test_purge_fresh_queue_without_stats() {
    let (server, client) = common::setup_broker_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/queues/%2F/fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "fresh"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/queues/%2F/fresh/contents"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    assert_eq!(client.purge_queue("fresh").await.unwrap(), 0);
}

#[tokio::test]
async fn test_purge_missing_queue_is_an_error() {
    let (server, client) = common::setup_broker_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/queues/%2F/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "Object Not Found",
            "reason": "Not Found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.purge_queue("ghost").await.unwrap_err();
    assert!(format!("{err:#}").contains("Not found"));
}

#[tokio::test]
async fn test_purge_failure_is_an_error() {
    let (server, client) = common::setup_broker_mock().await;

    Mock::given(method("GET"))
        .and(path("/api/queues/%2F/q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messages": 3
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/queues/%2F/q/contents"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.purge_queue("q").await.unwrap_err();
    assert!(format!("{err:#}").contains("Server error"));
}
