//! End-to-end request/response contract of the gateway.

mod common;

use common::{spawn_gateway, start_mock_backend, Behavior};
use serde_json::json;
use transbasket_client::TranslateRequest;

const UUID: &str = "550e8400-e29b-41d4-a716-446655440000";
const TIMESTAMP: &str = "2025-10-10T01:23:45.678Z";

fn request(text: &str) -> TranslateRequest {
    TranslateRequest::new("kor", "eng", text)
        .with_uuid(UUID)
        .with_timestamp(TIMESTAMP)
}

#[tokio::test]
async fn test_success_echoes_correlation_fields() {
    let backend = start_mock_backend(Behavior::Echo).await;
    let gw = spawn_gateway(&backend.base_url, |_| {}).await;

    let result = gw.client.translate(&request("안녕하세요")).await.unwrap();
    assert_eq!(result.status, 200);
    assert_eq!(result.body["uuid"], UUID);
    assert_eq!(result.body["timestamp"], TIMESTAMP);
    assert_eq!(result.body["from"], "kor");
    assert_eq!(result.body["to"], "eng");
    assert_eq!(result.translated_text(), Some("[English] 안녕하세요"));
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_language_codes_are_normalized() {
    let backend = start_mock_backend(Behavior::Echo).await;
    let gw = spawn_gateway(&backend.base_url, |_| {}).await;

    let req = TranslateRequest::new("KOR", "Eng", "hi");
    let result = gw.client.translate(&req).await.unwrap();
    assert_eq!(result.status, 200);
    assert_eq!(result.body["from"], "kor");
    assert_eq!(result.body["to"], "eng");
    assert_eq!(result.body["uuid"], req.uuid.as_str());
}

#[tokio::test]
async fn test_semantic_errors_are_422() {
    let backend = start_mock_backend(Behavior::Echo).await;
    let gw = spawn_gateway(&backend.base_url, |_| {}).await;

    let cases = [
        (request("hi").with_uuid("invalid-uuid"), "INVALID_UUID"),
        (request("hi").with_timestamp("2025-10-10 01:23:45"), "INVALID_TIMESTAMP"),
        (TranslateRequest::new("kor", "xyz", "hi"), "UNSUPPORTED_LANGUAGE"),
        (request(""), "EMPTY_TEXT"),
        (request(" \n\t "), "EMPTY_TEXT"),
        (request(&"가".repeat(10_001)), "TEXT_TOO_LONG"),
    ];
    for (req, code) in cases {
        let result = gw.client.translate(&req).await.unwrap();
        assert_eq!(result.status, 422, "{}", code);
        assert_eq!(result.error_code(), Some(code));
    }
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_missing_and_mistyped_fields_are_422() {
    let backend = start_mock_backend(Behavior::Echo).await;
    let gw = spawn_gateway(&backend.base_url, |_| {}).await;

    let body = json!({"timestamp": TIMESTAMP, "uuid": UUID, "from": "kor", "to": "eng"});
    let result = gw.client.post_raw(body.to_string()).await.unwrap();
    assert_eq!(result.status, 422);
    assert_eq!(result.body["field"], "text");
    assert_eq!(result.body["uuid"], UUID);

    let body = json!({"timestamp": TIMESTAMP, "uuid": UUID, "from": "kor", "to": "eng", "text": 42});
    let result = gw.client.post_raw(body.to_string()).await.unwrap();
    assert_eq!(result.status, 422);

    let result = gw.client.post_raw("[1, 2, 3]").await.unwrap();
    assert_eq!(result.status, 422);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let backend = start_mock_backend(Behavior::Echo).await;
    let gw = spawn_gateway(&backend.base_url, |_| {}).await;

    let result = gw.client.post_raw("{\"uuid\": ").await.unwrap();
    assert_eq!(result.status, 400);
    assert_eq!(result.error_code(), Some("PARSE_ERROR"));
    assert!(result.body.get("uuid").is_none());
}

#[tokio::test]
async fn test_identical_requests_get_identical_answers() {
    let backend = start_mock_backend(Behavior::Echo).await;
    let gw = spawn_gateway(&backend.base_url, |_| {}).await;

    let first = gw.client.translate(&request("same")).await.unwrap();
    let second = gw.client.translate(&request("same")).await.unwrap();
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn test_health_via_client() {
    let backend = start_mock_backend(Behavior::Echo).await;
    let gw = spawn_gateway(&backend.base_url, |_| {}).await;

    let (status, health) = gw.client.health().await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "transbasket");

    gw.shutdown.trigger();
    gw.server.await.unwrap();
}
