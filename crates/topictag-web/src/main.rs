//! Topic Tagging API server
//!
//! Run with: cargo run -p topictag-web

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use topictag_model::provision;
use topictag_web::{config::Config, router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("topictag_web=debug,topictag_model=debug,info")),
        )
        .init();

    info!("Starting Topic Tagging API...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("could not load configuration")?;
    info!("Model: {} at {:?}", config.model.model_id, config.model.path);

    // Nothing is served until the classifier is ready.
    let classifier = provision::acquire(&config.model.path, config.model.pipeline())
        .await
        .context("failed to initialize the classifier")?;

    let state = AppState::new(Arc::new(classifier), config.model.model_id.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("could not bind {}", config.server.bind))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

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
