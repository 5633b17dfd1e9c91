//! REST API for the banking agent router
//!
//! `/run` keeps the agent-runner wire shape (message parts in, model events
//! out); `/api/chat` is the flat JSON endpoint used by the web client.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use crate::agent::Orchestrator;
use crate::metrics::MetricsSnapshot;
use crate::models::{AnswerStatus, Label, Query, RoutingSource};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessagePart {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: Message,
    #[serde(default)]
    pub streaming: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

/// =============================
/// Response Models
/// =============================

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EventContent {
    pub parts: Vec<MessagePartOut>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessagePartOut {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RunEvent {
    pub content: EventContent,
    pub role: String,
}

impl RunEvent {
    fn model(text: impl Into<String>) -> Self {
        Self {
            content: EventContent {
                parts: vec![MessagePartOut { text: text.into() }],
            },
            role: "model".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub events: Vec<RunEvent>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub answer: String,
    pub label: Label,
    pub routing: RoutingSource,
    pub status: AnswerStatus,
    pub session_id: String,
    pub user_id: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

/// =============================
/// Helpers
/// =============================

pub fn stable_uuid_from_string(input: &str) -> uuid::Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    uuid::Uuid::from_bytes(bytes)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn metrics_handler(State(state): State<ApiState>) -> Json<MetricsSnapshot> {
    Json(state.orchestrator.metrics().snapshot())
}

/// =============================
/// Agent-runner Endpoint
/// =============================

#[instrument(skip_all)]
async fn run_agent(State(state): State<ApiState>, Json(req): Json<RunRequest>) -> Json<RunResponse> {
    info!(app = %req.app_name, session_id = %req.session_id, "Run request");
    if req.streaming {
        info!("Streaming requested, replying with a single event");
    }

    // a message without parts is an empty query
    let text = req
        .new_message
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let query = Query::new(text)
        .with_session(req.session_id.clone())
        .with_user(req.user_id.clone());

    let event = match state.orchestrator.run(&query).await {
        Ok(result) => RunEvent::model(result.answer.text),
        Err(e) => {
            error!(error = %e, "Run failed");
            RunEvent::model(format!("Error: {}", e))
        }
    };

    Json(RunResponse {
        events: vec![event],
    })
}

/// =============================
/// Chat Endpoint
/// =============================

#[instrument(skip_all)]
async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let user_id = non_blank(req.user_id.as_deref())
        .unwrap_or("anonymous-user")
        .to_string();
    let session_id = non_blank(req.session_id.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| stable_uuid_from_string(&user_id).to_string());

    info!(user_id = %user_id, session_id = %session_id, "Chat request");

    let query = Query::new(req.message)
        .with_session(session_id.clone())
        .with_user(user_id.clone());

    match state.orchestrator.run(&query).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(ChatReply {
                answer: result.answer.text,
                label: result.classification.label,
                routing: result.classification.source,
                status: result.answer.status,
                session_id,
                user_id,
            })),
        ),
        Err(e) => {
            error!(error = %e, "Chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("Routing failed: {}", e))),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/run", post(run_agent))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(orchestrator: Arc<Orchestrator>, port: u16) -> crate::Result<()> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_uuid_is_deterministic_v4() {
        let a = stable_uuid_from_string("user-1");
        let b = stable_uuid_from_string("user-1");
        let c = stable_uuid_from_string("user-2");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn test_run_request_parses_without_streaming_flag() {
        let req: RunRequest = serde_json::from_value(serde_json::json!({
            "app_name": "bank",
            "user_id": "u1",
            "session_id": "s1",
            "new_message": { "role": "user", "parts": [{ "text": "hi" }] }
        }))
        .unwrap();

        assert!(!req.streaming);
        assert_eq!(req.new_message.parts[0].text, "hi");
    }

    #[test]
    fn test_run_event_shape() {
        let value = serde_json::to_value(RunEvent::model("hello")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "content": { "parts": [{ "text": "hello" }] }, "role": "model" })
        );
    }
}
