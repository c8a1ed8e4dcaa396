use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unconf_api::config::AppConfig;
use unconf_api::database::build_store;
use unconf_api::{app, permissions, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, API_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting unconf-api in {:?} mode", config.environment);

    let matrix = permissions::validate().context("permission table is invalid")?;
    info!("Permission matrix loaded ({} permissions)", matrix.len());

    if config.api.secret_key.is_none() {
        info!("API_SECRET_KEY not set; every /api/v1 request will be rejected");
    }

    let store = build_store(&config).await.context("failed to open store")?;
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("unconf-api listening on http://{}", bind_addr);
    axum::serve(listener, app(AppState::new(config, store))).await?;
    Ok(())
}
