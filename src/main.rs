//! Library gateway server
//!
//! Serves the REST API and proxies every table access to the hosted store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_gateway::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    store::RemoteStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_gateway={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting library gateway v{}", env!("CARGO_PKG_VERSION"));

    let store = RemoteStore::from_config(&config.remote).context("Failed to create remote store client")?;
    tracing::info!("Proxying tables to {}", config.remote.url);

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let repository = Repository::new(store);
    let services = Services::new(repository, &config);

    if let Err(e) = services.auth.ensure_bootstrap_admin().await {
        tracing::warn!("Could not ensure bootstrap admin account: {}", e);
    }

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
