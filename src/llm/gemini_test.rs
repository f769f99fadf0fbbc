use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;

use super::*;

// =============================================================================
// parse_response
// =============================================================================

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Hello" }], "role": "model" },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 1 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.first_text(), Some("Hello"));
}

#[test]
fn parse_error_body_on_success_status() {
    let resp = parse_response(r#"{"error":{"message":"quota exceeded"}}"#).unwrap();
    assert!(resp.first_text().is_none());
    assert_eq!(resp.error.unwrap().message.as_deref(), Some("quota exceeded"));
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

// =============================================================================
// HTTP round trip against a local fake endpoint
// =============================================================================

#[derive(Debug, Clone)]
struct Seen {
    key: Option<String>,
    content_type: Option<String>,
    body: serde_json::Value,
}

#[derive(Clone)]
struct Fake {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

async fn fake_generate(
    State(fake): State<Fake>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let seen = Seen {
        key: query.get("key").cloned(),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
    };
    fake.seen.lock().unwrap().push(seen);
    (fake.status, fake.body.clone())
}

async fn spawn_fake(status: StatusCode, body: &str) -> (GeminiConfig, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let fake = Fake { status, body: body.to_string(), seen: Arc::clone(&seen) };
    let app = Router::new()
        .route("/v1beta/models/test-model:generateContent", post(fake_generate))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let config = GeminiConfig::new("test-key")
        .with_base_url(&format!("http://{addr}/v1beta"))
        .with_model("test-model");
    (config, seen)
}

#[tokio::test]
async fn generate_posts_prompt_with_key_in_query() {
    let (config, seen) = spawn_fake(
        StatusCode::OK,
        r#"{"candidates":[{"content":{"parts":[{"text":"Kohli scored 183"}]}}]}"#,
    )
    .await;
    let client = GeminiClient::new(config).unwrap();

    let resp = client
        .generate(&GenerateContentRequest::user_prompt("highest score?"))
        .await
        .unwrap();
    assert_eq!(resp.first_text(), Some("Kohli scored 183"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].key.as_deref(), Some("test-key"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        seen[0].body,
        serde_json::json!({ "contents": [{ "parts": [{ "text": "highest score?" }], "role": "user" }] })
    );
}

#[tokio::test]
async fn generate_non_success_status_keeps_body() {
    let (config, _seen) =
        spawn_fake(StatusCode::BAD_REQUEST, r#"{"error":{"code":400,"message":"bad key"}}"#).await;
    let client = GeminiClient::new(config).unwrap();

    let err = client
        .generate(&GenerateContentRequest::user_prompt("hi"))
        .await
        .unwrap_err();
    assert!(matches!(&err, LlmError::ApiResponse { status: 400, .. }));
    assert_eq!(err.body_message().as_deref(), Some("bad key"));
}

#[tokio::test]
async fn generate_malformed_success_body_is_parse_error() {
    let (config, _seen) = spawn_fake(StatusCode::OK, "<html>oops</html>").await;
    let client = GeminiClient::new(config).unwrap();

    let err = client
        .generate(&GenerateContentRequest::user_prompt("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[tokio::test]
async fn generate_connection_refused_is_request_error_without_key() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = GeminiConfig::new("very-secret-key").with_base_url(&format!("http://{addr}"));
    let client = GeminiClient::new(config).unwrap();

    let err = client
        .generate(&GenerateContentRequest::user_prompt("hi"))
        .await
        .unwrap_err();
    assert!(matches!(&err, LlmError::ApiRequest(_)));
    assert!(!err.to_string().contains("very-secret-key"));
}

#[test]
fn model_accessor() {
    let client = GeminiClient::new(GeminiConfig::new("k").with_model("gemini-pro")).unwrap();
    assert_eq!(client.model(), "gemini-pro");
}
