//! Error types surfaced over HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use topictag_model::ModelError;

pub const MISSING_FIELDS: &str = "Both 'title' and 'abstract' are required";

/// Failures of the classify endpoint. Every variant renders `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request reached us but lacks what the model needs.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Inference(#[from] ModelError),

    /// Body decoding, task join and anything else outside the model.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn missing_fields() -> Self {
        ApiError::Validation(MISSING_FIELDS.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// A failed health probe, rendered as `{"status": "unhealthy", "error": ...}`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HealthError(pub String);

#[derive(Debug, Serialize)]
struct UnhealthyBody {
    status: &'static str,
    error: String,
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        tracing::warn!("Health check failed: {}", self.0);
        let body = UnhealthyBody { status: "unhealthy", error: self.0 };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
