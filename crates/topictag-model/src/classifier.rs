//! The classification seam the HTTP layer talks to.

use serde::{Deserialize, Serialize};

use crate::Result;

/// One ranked label with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

/// A loaded text classifier.
///
/// Implementations are built once at startup and then shared read-only
/// across request handlers, so `classify` takes `&self`.
pub trait Classifier: Send + Sync {
    /// Classify one input, returning at most `top_k` predictions, best first.
    fn classify(&self, text: &str) -> Result<Vec<Prediction>>;
}
