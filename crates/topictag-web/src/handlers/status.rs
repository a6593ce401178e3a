//! Liveness, version and introspection endpoints.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::HealthError;
use crate::state::{AppState, SharedState};

pub const API_VERSION: &str = "1.0.0";
pub const API_DESCRIPTION: &str = "API for classifying text using OpenAlex topic classification";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub description: &'static str,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ApiIndex {
    pub message: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub instructions: &'static str,
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Result<Json<HealthStatus>, HealthError> {
    probe(&state)?;
    Ok(Json(HealthStatus { status: "healthy", message: "API is up and running" }))
}

/// Liveness only: the classifier exists by construction once we serve.
/// Deeper checks (e.g. a test inference) would report through `HealthError`.
fn probe(_state: &AppState) -> Result<(), HealthError> {
    Ok(())
}

/// GET /version
pub async fn version(State(state): State<SharedState>) -> Json<VersionInfo> {
    Json(VersionInfo {
        version: API_VERSION,
        description: API_DESCRIPTION,
        model: state.model_id.clone(),
    })
}

/// GET /
pub async fn home() -> Json<ApiIndex> {
    let endpoints = BTreeMap::from([
        ("/", "Introduction and available endpoints"),
        ("/classify", "POST endpoint for text classification (requires 'title' and 'abstract')"),
        ("/health", "GET endpoint to check the health of the API"),
        ("/version", "GET endpoint to get API version and metadata"),
    ]);

    Json(ApiIndex {
        message: "Welcome to the Topic Tagging API",
        endpoints,
        instructions: "Use /classify with a JSON payload to classify text.",
    })
}
