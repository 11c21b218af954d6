// handlers/public/status.rs - GET / and GET /health handlers

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::ApiResponse;

/// GET / - Service descriptor
pub async fn root(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Admin Console",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Session guard and entity edit workflow for the admin console",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "session": "/api/session (public - POST issue, DELETE revoke, GET read)",
            "entities": "/admin/api/entities/:kind/{fields,validate} (protected)",
        },
        "guard": {
            "protected_prefixes": state.guard.prefixes(),
            "login_path": state.guard.login_path(),
        }
    }))
}

/// GET /health - Liveness
pub async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
