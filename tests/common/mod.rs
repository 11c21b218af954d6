#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use admin_console::app::{router, AppState};
use admin_console::config::{
    AppConfig, Environment, GuardConfig, RemoteConfig, SecurityConfig, ServerConfig, SessionConfig,
};

/// Console config for tests: default guard prefixes, `token` cookie.
pub fn test_config(remote_base_url: &str) -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        session: SessionConfig {
            cookie_name: "token".to_string(),
            secure_cookie: false,
        },
        guard: GuardConfig::default(),
        remote: RemoteConfig {
            base_url: remote_base_url.to_string(),
            timeout_secs: 5,
        },
        security: SecurityConfig {
            enable_cors: false,
            cors_origins: Vec::new(),
        },
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

/// Serve `app` on a free port inside the current test runtime.
async fn serve(app: Router) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", base_url))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer { port, base_url };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            // Any HTTP answer means the listener is up
            if client.get(format!("{}/health", self.base_url)).send().await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn spawn_console(config: AppConfig) -> Result<TestServer> {
    serve(router(AppState::new(config))).await
}

/// Client that reports redirects instead of following them.
pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

struct StubState {
    calls: Mutex<Vec<RecordedCall>>,
    states: Mutex<(StatusCode, Value)>,
    mutation: Mutex<(StatusCode, Value)>,
    entities: Mutex<Vec<(String, String, Value)>>,
}

/// In-process stand-in for the remote API under `/api`.
#[derive(Clone)]
pub struct StubRemote {
    state: Arc<StubState>,
    pub server_url: String,
}

impl StubRemote {
    pub async fn spawn() -> Result<Self> {
        let state = Arc::new(StubState {
            calls: Mutex::new(Vec::new()),
            states: Mutex::new((
                StatusCode::OK,
                json!([
                    {"id": 1, "stateName": "Texas"},
                    {"id": 2, "stateName": "Ohio"}
                ]),
            )),
            mutation: Mutex::new((StatusCode::OK, json!({"status": "success", "message": "Saved"}))),
            entities: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/api/states", get(states))
            .route("/api/:collection", axum::routing::post(create))
            .route("/api/:collection/:id", get(fetch).put(update))
            .with_state(state.clone());

        let server = serve(app).await?;
        Ok(Self {
            state,
            server_url: server.base_url,
        })
    }

    pub fn base_url(&self) -> String {
        format!("{}/api", self.server_url)
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.base_url(),
            timeout_secs: 5,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn mutation_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == Method::POST || c.method == Method::PUT)
            .collect()
    }

    pub fn respond_to_states(&self, status: StatusCode, body: Value) {
        *self.state.states.lock().unwrap() = (status, body);
    }

    pub fn respond_to_mutations(&self, status: StatusCode, body: Value) {
        *self.state.mutation.lock().unwrap() = (status, body);
    }

    pub fn put_entity(&self, collection: &str, id: &str, body: Value) {
        self.state
            .entities
            .lock()
            .unwrap()
            .push((collection.to_string(), id.to_string(), body));
    }
}

fn record(state: &StubState, method: Method, path: String, headers: &HeaderMap, body: Option<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.calls.lock().unwrap().push(RecordedCall { method, path, authorization, body });
}

async fn states(State(state): State<Arc<StubState>>, headers: HeaderMap) -> impl IntoResponse {
    record(&state, Method::GET, "/api/states".to_string(), &headers, None);
    let (status, body) = state.states.lock().unwrap().clone();
    (status, Json(body))
}

async fn create(
    State(state): State<Arc<StubState>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&state, Method::POST, format!("/api/{}", collection), &headers, Some(body));
    let (status, body) = state.mutation.lock().unwrap().clone();
    (status, Json(body))
}

async fn update(
    State(state): State<Arc<StubState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&state, Method::PUT, format!("/api/{}/{}", collection, id), &headers, Some(body));
    let (status, body) = state.mutation.lock().unwrap().clone();
    (status, Json(body))
}

async fn fetch(
    State(state): State<Arc<StubState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&state, Method::GET, format!("/api/{}/{}", collection, id), &headers, None);
    let found = state
        .entities
        .lock()
        .unwrap()
        .iter()
        .find(|(c, i, _)| *c == collection && *i == id)
        .map(|(_, _, body)| body.clone());

    match found {
        Some(body) => (StatusCode::OK, Json(json!({ "data": body }))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))),
    }
}
