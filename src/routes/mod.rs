// src/routes/mod.rs

use crate::{handlers::session_handler, session::ws_handler, state::AppState};
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session", post(session_handler::create_session))
        .route("/session/:id", get(session_handler::get_session))
        .route("/ws/:session_id", get(ws_handler))
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
