// src/handlers/session_handler.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::AppError;
use crate::session::SessionSummary;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
}

/// POST /session — тело не нужно; 201 с новым id или 429 при переполнении.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), AppError> {
    let session_id = state.manager.create_session().await?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// GET /session/:id — подтверждение существования сессии или 404.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, AppError> {
    let summary = state.manager.get_session(&id).await.ok_or(AppError::NotFound)?;
    Ok(Json(summary))
}
