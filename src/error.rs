// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::session::SessionError;

#[derive(Debug)]
pub enum AppError {
    CapacityExceeded,
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::CapacityExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "maximum number of sessions reached".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "session not found".to_string()),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::CapacityExceeded => AppError::CapacityExceeded,
            SessionError::NotFound => AppError::NotFound,
        }
    }
}
