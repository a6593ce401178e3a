//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    classify::classify,
    status::{health, home, version},
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/",         get(home))
        .route("/classify", post(classify))
        .route("/health",   get(health))
        .route("/version",  get(version))

        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
