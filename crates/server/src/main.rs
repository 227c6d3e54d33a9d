//! ActiReco HTTP server.
//!
//! Loads configuration from the environment, initializes the
//! recommendation service and serves the API until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{AppState, Config, RecommendationService, router};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!("Starting ActiReco server");

    let service = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || RecommendationService::initialize(&config))
            .await
            .context("Initialization task panicked")?
            .context("Failed to initialize recommendation service")?
    };

    if config.admin_api_key.is_none() {
        info!("ADMIN_API_KEY not set, admin endpoints disabled");
    }

    let state = AppState::new(Arc::new(service), config.admin_api_key.clone());
    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
