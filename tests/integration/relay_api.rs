//! Integration tests for the relay HTTP API
//!
//! Drives the full Axum router with a mock conversation service and checks
//! the wire shapes clients depend on: JSON bodies, the NDJSON stream
//! framing, and the validation error contract.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use inconvo_relay::client::mock::{MockConversationService, MockEventBuilder, MockScript};
use inconvo_relay::client::types::InconvoResponse;
use inconvo_relay::web::{build_router, RelayState};

fn router_with(script: MockScript) -> (axum::Router, Arc<MockConversationService>) {
    let service = Arc::new(MockConversationService::new().with_script(script));
    let router = build_router(RelayState::new(service.clone()), true);
    (router, service)
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_conversation_create_passes_scope_through() {
    let (app, service) = router_with(MockScript::default().with_conversation_id("conv-int-1"));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/inconvo/conversations",
            serde_json::json!({ "organisationId": "42" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["id"], "conv-int-1");

    let creates = service.captured_creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].organisation_id, Some(42));
}

#[tokio::test]
async fn test_conversation_list_and_retrieve() {
    let (app, _service) = router_with(MockScript::default().with_conversation_id("conv-listed"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/inconvo/conversations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"][0]["id"], "conv-listed");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/inconvo/conversations?id=conv-direct")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["id"], "conv-direct");
}

#[tokio::test]
async fn test_respond_requires_both_fields() {
    let (app, service) = router_with(MockScript::default());

    for body in [
        serde_json::json!({}),
        serde_json::json!({ "conversationId": "c1" }),
        serde_json::json!({ "message": "hello" }),
        serde_json::json!({ "conversationId": "  ", "message": "hello" }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/inconvo", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "conversationId and message are required");
    }

    assert!(service.captured_messages().is_empty());
}

#[tokio::test]
async fn test_respond_relays_ndjson_until_terminal_event() {
    let events = MockEventBuilder::new()
        .progress("Checking inventory levels")
        .progress("Summarizing")
        .completed(InconvoResponse::text("Twelve products are low on stock."))
        .build();
    let (app, service) = router_with(MockScript::default().with_events(events));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/inconvo",
            serde_json::json!({
                "conversationId": "conv-5",
                "message": "Which products are low on stock?"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = std::str::from_utf8(&body).unwrap();

    // Every line is a standalone JSON document and the last is terminal.
    let frames: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["type"], "response.progress");
    assert_eq!(frames[1]["message"], "Summarizing");
    assert_eq!(frames[2]["type"], "response.completed");
    assert_eq!(
        frames[2]["response"]["message"],
        "Twelve products are low on stock."
    );

    assert_eq!(
        service.captured_messages(),
        vec![(
            "conv-5".to_string(),
            "Which products are low on stock?".to_string()
        )]
    );
}

#[tokio::test]
async fn test_respond_relays_error_events() {
    let events = MockEventBuilder::new()
        .progress("working")
        .error("agent failed")
        .build();
    let (app, _service) = router_with(MockScript::default().with_events(events));

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/inconvo",
            serde_json::json!({ "conversationId": "c1", "message": "hi" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = std::str::from_utf8(&body).unwrap();
    let last: serde_json::Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
    assert_eq!(last["type"], "error");
    assert_eq!(last["message"], "agent failed");
}
