//! One-time provisioning of the classifier at process start.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::artifact::ModelArtifact;
use crate::bert::BertTopicClassifier;
use crate::{ModelError, PipelineConfig, Result};

/// Resolve a ready classifier.
///
/// Loads from `path` when it exists; otherwise downloads `config.model_id`
/// from the Hub, saves it to `path` for the next start, and loads that.
/// `config` (top-k, truncation, max length) is applied on both paths.
pub async fn acquire(path: impl AsRef<Path>, config: PipelineConfig) -> Result<BertTopicClassifier> {
    config.validate()?;
    let path: PathBuf = path.as_ref().to_path_buf();
    let start = Instant::now();

    let classifier = tokio::task::spawn_blocking(move || {
        let artifact = if path.exists() {
            info!("Loading model from {:?}...", path);
            ModelArtifact::open(&path)?
        } else {
            info!("Model not found locally. Downloading {}...", config.model_id);
            ModelArtifact::download(&config.model_id, &path)?
        };
        BertTopicClassifier::load(&artifact, config)
    })
    .await
    .map_err(|e| ModelError::ModelLoad(e.to_string()))??;

    info!("Classifier provisioned in {:.2}s", start.elapsed().as_secs_f32());
    Ok(classifier)
}
