use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::guard::RouteGuard;
use crate::handlers::{protected, public};
use crate::middleware::session_guard_middleware;

/// Shared router state. Built from an explicit config so tests can run
/// routers with their own prefixes and cookie names.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub guard: Arc<RouteGuard>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let guard = RouteGuard::from_config(&config.guard);
        Self {
            config: Arc::new(config),
            guard: Arc::new(guard),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::status::root))
        .route("/health", get(public::status::health))
        .merge(session_routes())
        // Protected (by path prefix, see RouteGuard)
        .merge(entity_routes())
        // Global middleware
        .layer(from_fn_with_state(state.clone(), session_guard_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_routes() -> Router<AppState> {
    use public::session;

    Router::new().route(
        "/api/session",
        post(session::issue).delete(session::revoke).get(session::read),
    )
}

fn entity_routes() -> Router<AppState> {
    use protected::entities;

    Router::new()
        .route("/admin/api/entities/:kind/fields", get(entities::fields_get))
        .route("/admin/api/entities/:kind/validate", post(entities::validate_post))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentials are required for the session cookie to cross origins
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        .allow_credentials(true)
}
