//! Chat handlers: the caller side of the resolution pipeline.
//!
//! The gateway owns each session's history. The orchestrator only ever sees the
//! current question; history is recorded after the call, never passed into it.

use crate::AppState;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Chat request from the UI.
#[derive(serde::Deserialize)]
pub(crate) struct ChatRequest {
    pub(crate) question: String,
    /// Existing session to append to. A new one is created when absent.
    #[serde(default)]
    pub(crate) session_id: Option<String>,
}

/// POST /api/v1/chat – resolve one question and record the exchange in the session history.
pub(crate) async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    if req.question.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "status": "error",
                "error": "question must not be empty"
            })),
        )
            .into_response();
    }

    let session_id = req
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::info!(session_id = %session_id, chars = req.question.len(), "Chat request received");

    // One question in flight at a time. The exchange is recorded under the same guard so
    // turns from concurrent requests never interleave, and a dropped request records nothing.
    let resolution = {
        let _turn = state.turn_lock.lock().await;
        let resolution = state.orchestrator.resolve_detailed(&req.question).await;
        state
            .sessions
            .record_turn(&session_id, &req.question, resolution.text());
        resolution
    };

    axum::Json(serde_json::json!({
        "status": "ok",
        "session_id": session_id,
        "response": resolution.text(),
        "source": resolution.source(),
    }))
    .into_response()
}

/// GET /api/v1/history/:session_id – ordered messages of a session (empty when unknown).
pub(crate) async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> axum::Json<serde_json::Value> {
    let history = state.sessions.history(&session_id);
    axum::Json(serde_json::json!({
        "session_id": session_id,
        "messages": history.messages(),
    }))
}

/// DELETE /api/v1/history/:session_id – "Clear Chat".
pub(crate) async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> axum::Json<serde_json::Value> {
    let cleared = state.sessions.clear(&session_id);
    tracing::info!(session_id = %session_id, cleared, "Chat history cleared");
    axum::Json(serde_json::json!({
        "status": "ok",
        "session_id": session_id,
        "cleared": cleared,
    }))
}
