//! Image-text similarity scoring.
//!
//! The model behind [`SimilarityScorer`] is opaque to the request pipeline: it
//! is constructed once at startup and then only used for read-only inference.
//! Tests substitute their own implementations.

use thiserror::Error;

use crate::canvas::Canvas;

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("model artifact not found: {0}")]
    ModelNotFound(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    /// The scorer returned a different number of probabilities than labels.
    #[error("expected {expected} probabilities, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("probability at index {index} is not finite")]
    NonFinite { index: usize },

    #[error("scorer backend '{0}' was not compiled in")]
    FeatureDisabled(String),
}

/// Maps an image and an ordered label list to one probability per label.
///
/// Implementations must be deterministic for a fixed `(image, labels)` pair and
/// return values index-aligned with `labels`.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, image: &Canvas, labels: &[String]) -> Result<Vec<f64>, ScorerError>;
}

impl<T: SimilarityScorer + ?Sized> SimilarityScorer for Box<T> {
    fn score(&self, image: &Canvas, labels: &[String]) -> Result<Vec<f64>, ScorerError> {
        (**self).score(image, labels)
    }
}

/// Reject scorer output that cannot be turned into a verdict.
pub fn validate_probabilities(probs: &[f64], labels: usize) -> Result<(), ScorerError> {
    if probs.len() != labels {
        return Err(ScorerError::LengthMismatch {
            expected: labels,
            actual: probs.len(),
        });
    }

    match probs.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(ScorerError::NonFinite { index }),
        None => Ok(()),
    }
}

/// Numerically stable softmax over raw similarity logits.
///
/// Logits arrive as `f32` from the model; probabilities are computed in `f64`.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .map(|&l| f64::from(l))
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (f64::from(l) - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
