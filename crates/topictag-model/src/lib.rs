//! Topictag Model
//!
//! Pure Rust OpenAlex topic classification using Candle (Hugging Face).
//! No Python dependency - the model is fetched from the Hugging Face Hub
//! once, saved to a local directory and loaded from there afterwards.
//!
//! # Example
//! ```no_run
//! use topictag_model::{provision, Classifier, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let classifier = provision::acquire("./saved_model", PipelineConfig::default()).await?;
//!
//!     let predictions = classifier.classify("<TITLE> Deep learning for NLP\n<ABSTRACT> We study transformer models.")?;
//!     for p in predictions {
//!         println!("{:.3} {}", p.score, p.label);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod bert;
pub mod classifier;
pub mod config;
pub mod error;
pub mod metadata;
pub mod provision;
pub mod scoring;

pub use bert::BertTopicClassifier;
pub use classifier::{Classifier, Prediction};
pub use config::{PipelineConfig, DEFAULT_MODEL_ID};
pub use error::{ModelError, Result};
