//! BERT sequence classifier using Candle.

use std::time::Instant;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::BertModel;
use tokenizers::models::wordpiece::WordPieceBuilder;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{
    DecoderWrapper, ModelWrapper, NormalizerWrapper, PostProcessorWrapper, PreTokenizerWrapper,
    Tokenizer, TokenizerBuilder, TokenizerImpl, TruncationParams,
};
use tracing::{debug, info};

use crate::artifact::{ModelArtifact, TokenizerSource};
use crate::classifier::{Classifier, Prediction};
use crate::metadata::ModelMetadata;
use crate::scoring::{rank, Activation};
use crate::{ModelError, PipelineConfig, Result};

/// `BertForSequenceClassification` as a Candle model: encoder, pooler and
/// a linear head over the pooled `[CLS]` state.
pub struct BertTopicClassifier {
    encoder: BertModel,
    pooler: Linear,
    head: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    activation: Activation,
    config: PipelineConfig,
    device: Device,
}

impl BertTopicClassifier {
    /// Load a classifier from a saved model directory.
    ///
    /// Blocking: maps the weights and builds the graph. Call from
    /// `spawn_blocking` inside an async runtime.
    pub fn load(artifact: &ModelArtifact, config: PipelineConfig) -> Result<Self> {
        let start = Instant::now();
        config.validate()?;

        let device = select_device(&config);
        debug!("Using device: {:?}", device);

        let metadata = ModelMetadata::from_file(&artifact.config)?;

        // Positions past the embedding table cannot be looked up.
        let max_positions = metadata.bert.max_position_embeddings;
        let max_length = config.max_length.min(max_positions);
        if max_length < config.max_length {
            info!("Model holds {} positions, truncating to {}", max_positions, max_length);
        }
        let tokenizer = load_tokenizer(&artifact.tokenizer, config.truncation.then_some(max_length))?;

        info!("Loading model weights from {:?}", artifact.weights);
        let vb = if artifact.is_safetensors() {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[&artifact.weights], DType::F32, &device)
                    .map_err(|e| ModelError::ModelLoad(e.to_string()))?
            }
        } else {
            VarBuilder::from_pth(&artifact.weights, DType::F32, &device)
                .map_err(|e| ModelError::ModelLoad(e.to_string()))?
        };

        let bert_config = &metadata.bert;
        let hidden_size = bert_config.hidden_size;
        let num_labels = metadata.num_labels();

        let encoder = BertModel::load(vb.pp("bert"), bert_config)
            .or_else(|_| BertModel::load(vb.clone(), bert_config))
            .map_err(|e| ModelError::ModelLoad(format!("BertModel: {}", e)))?;

        let pooler = candle_nn::linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))
            .or_else(|_| candle_nn::linear(hidden_size, hidden_size, vb.pp("pooler.dense")))
            .map_err(|e| ModelError::ModelLoad(format!("Pooler: {}", e)))?;

        let head = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))
            .map_err(|e| ModelError::ModelLoad(format!("Classifier: {}", e)))?;

        let activation = Activation::for_model(metadata.problem_type.as_deref(), num_labels);
        info!(
            "Classifier ready: {} labels, {:?}, top_k={}, loaded in {:.2}s",
            num_labels,
            activation,
            config.top_k,
            start.elapsed().as_secs_f32()
        );

        Ok(Self {
            encoder,
            pooler,
            head,
            tokenizer,
            labels: metadata.labels,
            activation,
            config,
            device,
        })
    }

    fn scores(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self.tokenizer.encode(text, true)?;
        let ids = encoding.get_ids();
        if ids.is_empty() {
            return Err(ModelError::InvalidInput("input produced no tokens".to_string()));
        }
        debug!("Encoded {} tokens", ids.len());

        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?
            .unsqueeze(0)?
            .to_dtype(DType::F32)?;

        // [1, seq, hidden]
        let hidden = self.encoder.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        // [CLS] -> [1, hidden]
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.head.forward(&pooled)?;

        let probs = self.activation.apply(&logits)?;
        Ok(probs.squeeze(0)?.to_vec1::<f32>()?)
    }
}

impl Classifier for BertTopicClassifier {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>> {
        let start = Instant::now();
        let scores = self.scores(text)?;

        let predictions: Vec<Prediction> = rank(&scores, self.config.top_k)
            .into_iter()
            .map(|(i, score)| Prediction {
                label: self.labels.get(i).cloned().unwrap_or_else(|| format!("LABEL_{i}")),
                score,
            })
            .collect();

        debug!(
            "Classified {} chars into {} predictions in {:.2}ms",
            text.len(),
            predictions.len(),
            start.elapsed().as_secs_f32() * 1000.0
        );
        Ok(predictions)
    }
}

/// Select the best available device.
fn select_device(config: &PipelineConfig) -> Device {
    if !config.use_gpu {
        return Device::Cpu;
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("CUDA device available");
                return device;
            }
            Err(e) => {
                debug!("CUDA not available: {}, falling back to CPU", e);
            }
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Metal device available");
                return device;
            }
            Err(e) => {
                debug!("Metal not available: {}, falling back to CPU", e);
            }
        }
    }

    Device::Cpu
}

/// Load the tokenizer, truncating to `max_length` tokens when set.
fn load_tokenizer(source: &TokenizerSource, max_length: Option<usize>) -> Result<Tokenizer> {
    let mut tokenizer = match source {
        TokenizerSource::Json(path) => Tokenizer::from_file(path)?,
        TokenizerSource::Vocab(path) => wordpiece_from_vocab(path)?,
    };

    // One input per call, so padding only adds masked positions.
    tokenizer.with_padding(None);
    let truncation = max_length.map(|max_length| TruncationParams {
        max_length,
        ..Default::default()
    });
    tokenizer.with_truncation(truncation)?;

    Ok(tokenizer)
}

/// Build a cased BERT WordPiece tokenizer from a `vocab.txt`.
fn wordpiece_from_vocab(path: &std::path::Path) -> Result<Tokenizer> {
    let content = std::fs::read_to_string(path)?;
    let vocab: ahash::AHashMap<String, u32> = content
        .lines()
        .enumerate()
        .map(|(i, line)| (line.to_string(), i as u32))
        .collect();
    info!("Loaded vocab with {} tokens", vocab.len());

    let special = |token: &str| {
        vocab
            .get(token)
            .copied()
            .ok_or_else(|| ModelError::Tokenizer(format!("{token} missing from vocab")))
    };
    let cls = special("[CLS]")?;
    let sep = special("[SEP]")?;

    let wordpiece = WordPieceBuilder::new()
        .vocab(vocab)
        .continuing_subword_prefix("##".to_string())
        .max_input_chars_per_word(100)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| ModelError::Tokenizer(format!("WordPiece build: {}", e)))?;

    let tokenizer: TokenizerImpl<
        ModelWrapper,
        NormalizerWrapper,
        PreTokenizerWrapper,
        PostProcessorWrapper,
        DecoderWrapper,
    > = TokenizerBuilder::new()
        .with_model(wordpiece.into())
        // cased model: no lowercasing, keep accents
        .with_normalizer(Some(BertNormalizer::new(true, true, Some(false), false).into()))
        .with_pre_tokenizer(Some(BertPreTokenizer.into()))
        .with_post_processor(Some(
            BertProcessing::new(("[SEP]".to_string(), sep), ("[CLS]".to_string(), cls)).into(),
        ))
        .with_decoder(None)
        .build()
        .map_err(|e| ModelError::Tokenizer(e.to_string()))?;

    Ok(Tokenizer::from(tokenizer))
}
