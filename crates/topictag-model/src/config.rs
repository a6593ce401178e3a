//! Pipeline configuration for the topic classifier.

use crate::{ModelError, Result};

/// Hub id of the OpenAlex title/abstract topic model.
pub const DEFAULT_MODEL_ID: &str =
    "OpenAlex/bert-base-multilingual-cased-finetuned-openalex-topic-classification-title-abstract";

/// Longest sequence a BERT-base position table can hold.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// Configuration applied to the classification pipeline, whether the
/// model was freshly downloaded or loaded from a saved artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Hugging Face model ID
    pub model_id: String,

    /// Number of ranked predictions returned per call (default: 10)
    pub top_k: usize,

    /// Truncate inputs longer than `max_length` tokens (default: true)
    pub truncation: bool,

    /// Maximum sequence length in tokens (default: 512)
    pub max_length: usize,

    /// Use GPU if available (default: false)
    pub use_gpu: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            top_k: 10,
            truncation: true,
            max_length: MAX_SEQUENCE_LENGTH,
            use_gpu: false,
        }
    }
}

impl PipelineConfig {
    /// Use a custom model.
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the number of predictions returned.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set maximum sequence length.
    pub fn with_max_length(mut self, length: usize) -> Self {
        self.max_length = length;
        self
    }

    /// Reject settings the model cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(ModelError::Config("model_id must not be empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(ModelError::Config("top_k must be at least 1".to_string()));
        }
        if self.max_length == 0 || self.max_length > MAX_SEQUENCE_LENGTH {
            return Err(ModelError::Config(format!(
                "max_length must be between 1 and {MAX_SEQUENCE_LENGTH}, got {}",
                self.max_length
            )));
        }
        Ok(())
    }
}
