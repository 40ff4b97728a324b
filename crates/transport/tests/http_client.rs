//! Integration tests for the HTTP transport against a mock backend.

use httpmock::prelude::*;
use serde_json::json;
use tubechat_config::ApiConfig;
use tubechat_models::ResponseContext;
use tubechat_transport::{ChatApi, ContentApi, HttpApiClient, TransportError};

fn client_for(server: &MockServer) -> HttpApiClient {
    let config = ApiConfig {
        base_url: server.url("/api/v1/"),
        request_timeout_seconds: 5,
    };
    HttpApiClient::new(&config).expect("client should build")
}

fn content_json(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "content_type": "youtube",
        "source_url": format!("https://www.youtube.com/watch?v=vid{id}"),
        "content_text": "transcript",
        "content_metadata": { "video_id": format!("vid{id}") },
        "created_at": "2024-05-01T10:00:00.000001",
        "updated_at": "2024-05-01T10:00:00.000001"
    })
}

#[tokio::test]
async fn list_contents_parses_collection() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/content");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([content_json(1, "First"), content_json(2, "Second")]));
        })
        .await;

    let contents = client_for(&server).list_contents().await.expect("list should succeed");

    mock.assert_async().await;
    let titles: Vec<_> = contents.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn ingest_video_posts_the_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/content/youtube")
                .json_body(json!({ "video_url": "https://www.youtube.com/watch?v=vid9" }));
            then.status(200).json_body(content_json(9, "Ingested"));
        })
        .await;

    let item = client_for(&server)
        .ingest_video("https://www.youtube.com/watch?v=vid9")
        .await
        .expect("ingest should succeed");

    mock.assert_async().await;
    assert_eq!(item.id, 9);
    assert!(item.is_video());
}

#[tokio::test]
async fn delete_content_ignores_response_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/v1/content/2");
            then.status(200)
                .json_body(json!({ "message": "Content deleted successfully" }));
        })
        .await;

    client_for(&server)
        .delete_content(2)
        .await
        .expect("delete should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn create_chat_sends_user_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/chat").json_body(json!({ "user_id": 1 }));
            then.status(200).json_body(json!({
                "id": 5,
                "title": null,
                "created_at": "2024-05-01T09:00:00",
                "updated_at": "2024-05-01T09:00:00",
                "messages": []
            }));
        })
        .await;

    let chat = client_for(&server).create_chat(1).await.expect("create should succeed");

    mock.assert_async().await;
    assert_eq!(chat.id, 5);
    assert!(chat.messages.is_empty());
}

#[tokio::test]
async fn send_message_includes_video_id_when_given() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/chat/5/message")
                .json_body(json!({ "message": "what is this about?", "video_id": "vid9" }));
            then.status(200).json_body(json!({
                "message": {
                    "id": 77,
                    "chat_id": 5,
                    "content_id": 9,
                    "role": "assistant",
                    "content": "It is about ownership.",
                    "created_at": "2024-05-01T09:00:01",
                    "updated_at": "2024-05-01T09:00:01"
                },
                "context": { "video_title": "Rust" },
                "sources": null
            }));
        })
        .await;

    let response = client_for(&server)
        .send_message(5, "what is this about?", Some("vid9"))
        .await
        .expect("send should succeed");

    mock.assert_async().await;
    assert_eq!(response.message.id, 77);
    assert_eq!(response.message.content_id, Some(9));
    assert!(matches!(response.context, Some(ResponseContext::Fields(_))));
    assert!(response.sources.is_none());
}

#[tokio::test]
async fn list_user_chats_hits_user_route() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/chat/user/3");
            then.status(200).json_body(json!([]));
        })
        .await;

    let chats = client_for(&server)
        .list_user_chats(3)
        .await
        .expect("listing should succeed");

    mock.assert_async().await;
    assert!(chats.is_empty());
}

#[tokio::test]
async fn not_found_surfaces_backend_detail() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/chat/404");
            then.status(404).json_body(json!({ "detail": "Chat not found" }));
        })
        .await;

    let err = client_for(&server)
        .fetch_chat(404)
        .await
        .expect_err("missing chat should fail");

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Chat not found");
}

#[tokio::test]
async fn server_error_without_detail_reports_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/content/1");
            then.status(503);
        })
        .await;

    let err = client_for(&server)
        .fetch_content(1)
        .await
        .expect_err("unavailable backend should fail");

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.to_string(), "Request failed with status code 503");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/content");
            then.status(200).json_body(json!({ "items": [] }));
        })
        .await;

    let err = client_for(&server)
        .list_contents()
        .await
        .expect_err("unexpected shape should fail");

    match err {
        TransportError::Decode { endpoint, .. } => assert_eq!(endpoint, "GET /content"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn invalid_base_url_is_rejected() {
    let config = ApiConfig {
        base_url: "::not-a-url::".to_string(),
        request_timeout_seconds: 5,
    };
    assert!(matches!(
        HttpApiClient::new(&config),
        Err(TransportError::InvalidBaseUrl { .. })
    ));
}
