// handlers/public/session.rs - POST/DELETE/GET /api/session handlers
//
// The browser holds the session token in an HttpOnly cookie. These endpoints
// are the only place it is written or cleared.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::session::{cookie, SessionToken, SESSION_TTL_HOURS};

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub token: String,
}

/// POST /api/session - Store a session token in the session cookie
///
/// Expected Input:
/// ```json
/// { "token": "string" }
/// ```
///
/// Expected Output:
/// ```json
/// { "success": true, "message": "Session started" }
/// ```
/// with `Set-Cookie: token=...; Path=/; HttpOnly; SameSite=Lax; Max-Age=36000`
pub async fn issue(
    State(state): State<AppState>,
    Json(payload): Json<IssueRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = SessionToken::new(payload.token)?;
    let settings = &state.config.session;
    let set_cookie = cookie::issue_cookie(&settings.cookie_name, &token, settings.secure_cookie);

    tracing::info!("Session cookie issued (expires in {}h)", SESSION_TTL_HOURS);
    Ok((
        [(SET_COOKIE, set_cookie)],
        Json(json!({
            "success": true,
            "message": "Session started"
        })),
    ))
}

/// DELETE /api/session - Clear the session cookie (idempotent)
pub async fn revoke(State(state): State<AppState>) -> impl IntoResponse {
    let settings = &state.config.session;
    let set_cookie = cookie::revoke_cookie(&settings.cookie_name, settings.secure_cookie);

    tracing::info!("Session cookie revoked");
    (
        [(SET_COOKIE, set_cookie)],
        Json(json!({
            "success": true,
            "message": "Session ended"
        })),
    )
}

/// GET /api/session - Current session token, or null
pub async fn read(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let token = cookie::read_cookie(&headers, &state.config.session.cookie_name);
    Json(json!({ "token": token.as_ref().map(SessionToken::as_str) }))
}
