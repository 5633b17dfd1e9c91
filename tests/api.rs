use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use banking_agent_router::agent::Orchestrator;
use banking_agent_router::api::{create_router, stable_uuid_from_string};
use banking_agent_router::config::AppConfig;
use banking_agent_router::generation::StaticGenerator;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    let orchestrator = Orchestrator::with_generator(
        &AppConfig::default(),
        Arc::new(StaticGenerator::new("Here is your answer.")),
    )
    .unwrap();
    create_router(Arc::new(orchestrator))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn run_returns_a_single_model_event() {
    let request = post_json(
        "/run",
        json!({
            "app_name": "cymbal",
            "user_id": "user-1",
            "session_id": "session-1",
            "new_message": { "role": "user", "parts": [{ "text": "What perks do I have?" }] }
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["role"], "model");
    assert_eq!(events[0]["content"]["parts"][0]["text"], "Here is your answer.");
}

#[tokio::test]
async fn run_without_parts_asks_for_clarification() {
    let request = post_json(
        "/run",
        json!({
            "app_name": "cymbal",
            "user_id": "user-1",
            "session_id": "session-1",
            "new_message": { "role": "user", "parts": [] }
        }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let text = body["events"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("For example"));
}

#[tokio::test]
async fn chat_reports_label_and_routing() {
    let request = post_json(
        "/api/chat",
        json!({ "message": "I want to pay off my credit card fastest", "user_id": "user-7" }),
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["label"], "PORTFOLIO");
    assert_eq!(data["routing"]["kind"], "rule");
    assert_eq!(data["status"], "answered");
    assert_eq!(data["answer"], "Here is your answer.");
    assert_eq!(
        data["session_id"],
        stable_uuid_from_string("user-7").to_string()
    );
}

#[tokio::test]
async fn chat_empty_message_falls_back() {
    let request = post_json("/api/chat", json!({ "message": "" }));
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["label"], "SPENDING");
    assert_eq!(body["data"]["routing"]["kind"], "fallback");
    assert_eq!(body["data"]["status"], "clarification");
}

#[tokio::test]
async fn metrics_count_routed_queries() {
    let app = app();

    let request = post_json("/api/chat", json!({ "message": "Who is the best advisor for me?" }));
    let (status, _) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queries_total"], 1);
    assert_eq!(body["routed_by_label"]["ADVISORS"], 1);
    assert_eq!(body["rule_matches_total"], 1);
}
