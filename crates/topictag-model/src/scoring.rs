//! Turning classifier logits into ranked label scores.

use candle_core::{D, Tensor};

/// Function applied to logits before ranking, chosen the same way the
/// `transformers` text-classification pipeline chooses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Softmax,
    Sigmoid,
}

impl Activation {
    pub fn for_model(problem_type: Option<&str>, num_labels: usize) -> Self {
        match problem_type {
            Some("multi_label_classification") => Activation::Sigmoid,
            _ if num_labels == 1 => Activation::Sigmoid,
            _ => Activation::Softmax,
        }
    }

    /// Apply over the last dimension of `logits`.
    pub fn apply(&self, logits: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Softmax => candle_nn::ops::softmax(logits, D::Minus1),
            Activation::Sigmoid => candle_nn::ops::sigmoid(logits),
        }
    }
}

/// Indices of the `top_k` highest scores, best first. Ties keep class order.
pub fn rank(scores: &[f32], top_k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(top_k);
    ranked
}
