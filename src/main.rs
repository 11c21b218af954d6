use anyhow::Context;
use tracing_subscriber::EnvFilter;

use admin_console::app::{router, AppState};
use admin_console::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CONSOLE_PORT, REMOTE_API_BASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Admin Console in {:?} mode", config.environment);
    if admin_console::is_production!() && !config.session.secure_cookie {
        tracing::warn!("Session cookie is not marked Secure in production");
    }

    let app = router(AppState::new(config.clone()));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Admin Console listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
