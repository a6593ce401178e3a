//! Configuration loading for the Topic Tagging API.
//! Reads topictag.toml from the current directory or the path in the
//! TOPICTAG_CONFIG env var; a missing file means built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use topictag_model::{PipelineConfig, DEFAULT_MODEL_ID};

pub const CONFIG_ENV: &str = "TOPICTAG_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "topictag.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String { "127.0.0.1:5000".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "bool_true")]
    pub truncation: bool,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub use_gpu: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            model_id: default_model_id(),
            top_k: default_top_k(),
            truncation: true,
            max_length: default_max_length(),
            use_gpu: false,
        }
    }
}

fn default_model_path() -> PathBuf { PathBuf::from("./saved_model") }
fn default_model_id()   -> String  { DEFAULT_MODEL_ID.to_string() }
fn default_top_k()      -> usize   { 10 }
fn default_max_length() -> usize   { 512 }
fn bool_true()          -> bool    { true }

impl ModelConfig {
    /// Pipeline settings handed to the provisioner.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            model_id: self.model_id.clone(),
            top_k: self.top_k,
            truncation: self.truncation,
            max_length: self.max_length,
            use_gpu: self.use_gpu,
        }
    }
}

impl Config {
    /// Load configuration from topictag.toml, then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            tracing::info!("Loaded configuration from {}", path);
            Self::from_toml_str(&content)?
        } else {
            tracing::info!("No config file at {}, using defaults", path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override selected settings from `TOPICTAG_*` variables.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("TOPICTAG_BIND") {
            self.server.bind = bind;
        }
        if let Some(path) = lookup("TOPICTAG_MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(model_id) = lookup("TOPICTAG_MODEL_ID") {
            self.model.model_id = model_id;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model
            .pipeline()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
