//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ContextResponse, ErrorResponse, PromptCardsResponse, SendMessageRequest, SuccessResponse,
    TurnResponse,
};
use super::AppState;
use crate::orchestrator::{ReasoningToggle, SubmitError, PROMPT_CARDS};
use crate::session::SessionSnapshot;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session state and live updates
        .route("/api/session", get(get_session))
        .route("/api/session/stream", get(stream_session))
        // User actions
        .route("/api/session/messages", post(send_message))
        .route("/api/session/prompt-cards/:id", post(send_prompt_card))
        .route("/api/session/reset", post(reset_session))
        .route("/api/session/reasoning", post(toggle_reasoning))
        .route("/api/session/context", post(attach_context))
        // Presets
        .route("/api/prompt-cards", get(list_prompt_cards))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session State
// ============================================================

async fn get_session(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.orchestrator.snapshot().await?))
}

async fn stream_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    // Subscribe before taking the snapshot so no update falls in between
    let updates = state.view.subscribe();
    let snapshot = state.orchestrator.snapshot().await?;
    Ok(sse_stream(snapshot, updates))
}

// ============================================================
// User Actions
// ============================================================

async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let turn_id = state.orchestrator.handle(&req.text).await?;
    Ok(Json(TurnResponse { turn_id }))
}

async fn send_prompt_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TurnResponse>, AppError> {
    let turn_id = state.orchestrator.submit_prompt_card(&id).await?;
    Ok(Json(TurnResponse { turn_id }))
}

async fn reset_session(State(state): State<AppState>) -> Result<Json<SuccessResponse>, AppError> {
    state.orchestrator.reset().await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn toggle_reasoning(
    State(state): State<AppState>,
) -> Result<Json<ReasoningToggle>, AppError> {
    Ok(Json(state.orchestrator.toggle_reasoning().await?))
}

async fn attach_context(State(state): State<AppState>) -> Result<Json<ContextResponse>, AppError> {
    let items = state.orchestrator.attach_context().await?;
    Ok(Json(ContextResponse { items }))
}

async fn list_prompt_cards() -> Json<PromptCardsResponse> {
    Json(PromptCardsResponse {
        cards: &PROMPT_CARDS,
    })
}

async fn get_version() -> &'static str {
    concat!("dvnc-agent ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Conflict(String),
    Unavailable(String),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Empty | SubmitError::UnknownPromptCard(_) => {
                AppError::BadRequest(e.to_string())
            }
            SubmitError::Busy => AppError::Conflict(e.to_string()),
            SubmitError::Closed => AppError::Unavailable(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
