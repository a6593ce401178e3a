//! Shared application state for the web server.

use std::sync::Arc;
use topictag_model::Classifier;

/// Shared state injected into every Axum handler.
///
/// Built once in `main` after the classifier is provisioned; handlers
/// only read it.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    /// Hub id reported by `/version`
    pub model_id: String,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, model_id: impl Into<String>) -> Self {
        Self { classifier, model_id: model_id.into() }
    }
}

pub type SharedState = Arc<AppState>;
