//! On-disk model artifact: what a saved model directory holds and how it
//! gets there from the Hub.

use std::fs;
use std::path::{Path, PathBuf};

use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tracing::{debug, info, warn};

use crate::{ModelError, Result};

pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const VOCAB_FILE: &str = "vocab.txt";
pub const SAFETENSORS_FILE: &str = "model.safetensors";
pub const PYTORCH_FILE: &str = "pytorch_model.bin";

/// Saved for completeness; loading never needs them.
const OPTIONAL_FILES: &[&str] = &["tokenizer_config.json", "special_tokens_map.json"];

/// Where the tokenizer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerSource {
    /// Serialized `tokenizers` pipeline
    Json(PathBuf),
    /// Plain WordPiece vocabulary, one token per line
    Vocab(PathBuf),
}

/// Resolved file set of a saved model directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    pub config: PathBuf,
    pub tokenizer: TokenizerSource,
    pub weights: PathBuf,
}

impl ModelArtifact {
    /// Locate the files of a saved model. Fails when any required piece is missing.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(ModelError::ModelLoad(format!(
                "{} is not a model directory",
                dir.display()
            )));
        }

        let config = dir.join(CONFIG_FILE);
        if !config.is_file() {
            return Err(ModelError::ModelLoad(format!("{CONFIG_FILE} missing in {}", dir.display())));
        }

        let tokenizer = if dir.join(TOKENIZER_FILE).is_file() {
            TokenizerSource::Json(dir.join(TOKENIZER_FILE))
        } else if dir.join(VOCAB_FILE).is_file() {
            TokenizerSource::Vocab(dir.join(VOCAB_FILE))
        } else {
            return Err(ModelError::ModelLoad(format!(
                "no {TOKENIZER_FILE} or {VOCAB_FILE} in {}",
                dir.display()
            )));
        };

        let weights = [SAFETENSORS_FILE, PYTORCH_FILE]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                ModelError::ModelLoad(format!("no model weights in {}", dir.display()))
            })?;

        Ok(Self { config, tokenizer, weights })
    }

    /// Whether the weights are safetensors (memory-mappable) rather than a pickle.
    pub fn is_safetensors(&self) -> bool {
        self.weights.extension().map(|e| e == "safetensors").unwrap_or(false)
    }

    /// Fetch `model_id` from the Hugging Face Hub and save it under `dir`.
    ///
    /// Files are staged in a sibling `.partial` directory and moved into
    /// place only once every required file is present, so an interrupted
    /// download never leaves a directory that looks like a saved model.
    pub fn download(model_id: &str, dir: &Path) -> Result<Self> {
        let staging = staging_dir(dir);
        if staging.exists() {
            debug!("Removing stale staging directory {:?}", staging);
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        if let Err(e) = fetch_into(model_id, &staging) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&staging, dir)?;
        info!("Model saved to {:?}", dir);

        Self::open(dir)
    }
}

fn staging_dir(dir: &Path) -> PathBuf {
    let mut name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "model".into());
    name.push(".partial");
    dir.with_file_name(name)
}

fn fetch_into(model_id: &str, target: &Path) -> Result<()> {
    let api = Api::new().map_err(|e| ModelError::Download(format!("API init: {}", e)))?;
    let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

    let save = |name: &str, cached: PathBuf| -> Result<()> {
        fs::copy(&cached, target.join(name))?;
        debug!("Saved {} from {:?}", name, cached);
        Ok(())
    };

    info!("Downloading {}...", CONFIG_FILE);
    let config = repo
        .get(CONFIG_FILE)
        .map_err(|e| ModelError::Download(format!("{CONFIG_FILE}: {}", e)))?;
    save(CONFIG_FILE, config)?;

    info!("Downloading tokenizer...");
    // tokenizer.json first (newer format), vocab.txt for older BERT repos
    match repo.get(TOKENIZER_FILE) {
        Ok(path) => save(TOKENIZER_FILE, path)?,
        Err(_) => {
            info!("{} not found, falling back to {}", TOKENIZER_FILE, VOCAB_FILE);
            let vocab = repo
                .get(VOCAB_FILE)
                .map_err(|e| ModelError::Download(format!("{VOCAB_FILE}: {}", e)))?;
            save(VOCAB_FILE, vocab)?;
        }
    }

    for &name in OPTIONAL_FILES {
        match repo.get(name) {
            Ok(path) => save(name, path)?,
            Err(e) => debug!("Skipping optional {}: {}", name, e),
        }
    }

    info!("Downloading model weights...");
    match repo.get(SAFETENSORS_FILE) {
        Ok(path) => save(SAFETENSORS_FILE, path)?,
        Err(e) => {
            warn!("{} unavailable ({}), trying {}", SAFETENSORS_FILE, e, PYTORCH_FILE);
            let path = repo
                .get(PYTORCH_FILE)
                .map_err(|e| ModelError::Download(format!("model weights: {}", e)))?;
            save(PYTORCH_FILE, path)?;
        }
    }

    Ok(())
}
