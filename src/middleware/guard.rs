use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::app::AppState;
use crate::guard::GuardDecision;
use crate::session::{cookie, SessionToken};

/// Session guard applied to the whole router.
///
/// Requests under a protected prefix without a session token are redirected
/// (303) to the login path; everything else passes through. When a token is
/// present it is injected as an `Extension<SessionToken>` for handlers.
pub async fn session_guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_session_token(request.headers(), &state.config.session.cookie_name);
    let path = request.uri().path().to_string();

    match state.guard.authorize(&path, token.as_ref()) {
        GuardDecision::Allow => {
            if let Some(token) = token {
                request.extensions_mut().insert(token);
            }
            next.run(request).await
        }
        GuardDecision::RedirectToLogin { location } => {
            tracing::info!("Redirecting unauthenticated request for {} to {}", path, location);
            Redirect::to(&location).into_response()
        }
    }
}

/// Session cookie first, then an `Authorization: Bearer` header for API clients.
fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    cookie::read_cookie(headers, cookie_name).or_else(|| {
        let auth_str = headers.get("authorization")?.to_str().ok()?;
        let token = auth_str.strip_prefix("Bearer ")?;
        SessionToken::new(token).ok()
    })
}
