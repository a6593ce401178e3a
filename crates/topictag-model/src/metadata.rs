//! Parsing of a sequence-classification `config.json`.

use std::collections::BTreeMap;
use std::path::Path;

use candle_transformers::models::bert::{Config, HiddenAct, PositionEmbeddingType};
use serde_json::Value;

use crate::Result;

/// Everything the classifier needs from `config.json`.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub bert: Config,
    /// Labels indexed by class id.
    pub labels: Vec<String>,
    /// `problem_type` as written by the trainer, if any.
    pub problem_type: Option<String>,
}

impl ModelMetadata {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let json: Value = serde_json::from_str(&content)?;
        Ok(Self::from_json(&json))
    }

    /// Build metadata from parsed JSON, using BERT-base defaults for
    /// missing hyper-parameters.
    pub fn from_json(json: &Value) -> Self {
        let usize_or = |key: &str, default: usize| {
            json.get(key).and_then(|v| v.as_u64()).map(|v| v as usize).unwrap_or(default)
        };
        let f64_or = |key: &str, default: f64| {
            json.get(key).and_then(|v| v.as_f64()).unwrap_or(default)
        };

        let hidden_act = match json.get("hidden_act").and_then(|v| v.as_str()) {
            Some("relu") => HiddenAct::Relu,
            Some("gelu_new") | Some("gelu_approximate") => HiddenAct::GeluApproximate,
            _ => HiddenAct::Gelu,
        };

        let bert = Config {
            vocab_size: usize_or("vocab_size", 119_547),
            hidden_size: usize_or("hidden_size", 768),
            num_hidden_layers: usize_or("num_hidden_layers", 12),
            num_attention_heads: usize_or("num_attention_heads", 12),
            intermediate_size: usize_or("intermediate_size", 3072),
            hidden_act,
            hidden_dropout_prob: f64_or("hidden_dropout_prob", 0.1),
            max_position_embeddings: usize_or("max_position_embeddings", 512),
            type_vocab_size: usize_or("type_vocab_size", 2),
            initializer_range: f64_or("initializer_range", 0.02),
            layer_norm_eps: f64_or("layer_norm_eps", 1e-12),
            pad_token_id: usize_or("pad_token_id", 0),
            position_embedding_type: PositionEmbeddingType::Absolute,
            use_cache: true,
            classifier_dropout: None,
            model_type: Some("bert".to_string()),
        };

        let labels = parse_labels(json);
        let problem_type = json
            .get("problem_type")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Self { bert, labels, problem_type }
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }
}

/// Read `id2label`, filling gaps with `LABEL_{i}`. Without a map the
/// label count comes from `num_labels` (2 when absent, as in `transformers`).
fn parse_labels(json: &Value) -> Vec<String> {
    let id2label: BTreeMap<usize, String> = json
        .get("id2label")
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let declared = json.get("num_labels").and_then(|v| v.as_u64()).map(|v| v as usize);
    let count = match id2label.keys().next_back() {
        Some(&max_id) => (max_id + 1).max(declared.unwrap_or(0)),
        None => declared.unwrap_or(2),
    };

    (0..count)
        .map(|i| id2label.get(&i).cloned().unwrap_or_else(|| format!("LABEL_{i}")))
        .collect()
}
