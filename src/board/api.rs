use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use taskboard_common::Status;
use taskboard_common::validation::INVALID_STATUS;
use tracing::error;

use super::auth::Authorized;
use super::db::DbHandle;
use super::payload;
use super::service;
use crate::errors::BoardError;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    /// Shared secret for mutating routes. `None` leaves the board open.
    pub api_token: Option<String>,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<String>),
    NotFound(String),
    Unauthorized,
    Internal(String),
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Validation(errors) => ApiError::Validation(errors),
            BoardError::NotFound { .. } => ApiError::NotFound("Not found".to_string()),
            BoardError::Unauthorized => ApiError::Unauthorized,
            BoardError::Storage(e) => ApiError::Internal(format!("{:#}", e)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![rejection.body_text()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({"errors": errors}))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({"error": msg}))).into_response()
            }
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response()
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Internal server error"})),
                )
                    .into_response()
            }
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/move", patch(move_task))
        .route("/api/lanes/{status}/rebalance", post(rebalance_lane))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> Json<Value> {
    Json(json!({"ok": true}))
}

async fn list_tasks(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let tasks = state.db.call(|db| service::list_tasks(db)).await?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<SharedState>,
    _auth: Authorized,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let draft = payload::parse_create(&body)?;
    let task = state
        .db
        .call(move |db| service::create_task(db, &draft, Utc::now()))
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.db.call(move |db| service::get_task(db, &id)).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    _auth: Authorized,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let patch = payload::parse_update(&body)?;
    let task = state
        .db
        .call(move |db| service::update_task(db, &id, &patch, Utc::now()))
        .await?;
    Ok(Json(task))
}

async fn move_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    _auth: Authorized,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let target = payload::parse_move(&body)?;
    let task = state
        .db
        .call(move |db| service::move_task(db, &id, &target, Utc::now()))
        .await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    _auth: Authorized,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .call(move |db| service::delete_task(db, &id))
        .await?;
    Ok(Json(json!({"ok": true})))
}

async fn rebalance_lane(
    State(state): State<SharedState>,
    Path(status): Path<String>,
    _auth: Authorized,
) -> Result<impl IntoResponse, ApiError> {
    let status =
        Status::from_str(&status).map_err(|_| ApiError::Validation(vec![INVALID_STATUS.into()]))?;
    let lane = state
        .db
        .call(move |db| service::rebalance_lane(db, status, Utc::now()))
        .await?;
    Ok(Json(lane))
}

// ── Tests ─────────────────────────────────────────────────────────────
