//! CLIP-backed similarity scorer.
//!
//! Loads a ViT-B/32 CLIP model with Candle from a local artifact directory
//! prepared ahead of deployment:
//!
//! ```text
//! model_dir/
//! ├── model.safetensors
//! └── tokenizer.json
//! ```
//!
//! The canvas is resized to fill 224x224 (center crop), converted to RGB and
//! normalised with the CLIP channel statistics. Candidate words are tokenised
//! and padded with the end-of-text token. `logits_per_image` is turned into a
//! probability vector with [`softmax`](crate::scorer::softmax).
//!
//! Built with the default `clip` feature. With `--no-default-features` the
//! candle stack is left out and [`ClipScorer::load`] always fails, which the
//! server binary treats as a fatal startup error.

use std::path::Path;

use crate::canvas::Canvas;
use crate::scorer::{ScorerError, SimilarityScorer};

#[cfg(feature = "clip")]
use candle_core::{DType, Device, Tensor};
#[cfg(feature = "clip")]
use candle_nn::VarBuilder;
#[cfg(feature = "clip")]
use candle_transformers::models::clip::{ClipConfig, ClipModel};
#[cfg(feature = "clip")]
use image::imageops::FilterType;
#[cfg(feature = "clip")]
use image::DynamicImage;
#[cfg(feature = "clip")]
use log::info;
#[cfg(feature = "clip")]
use tokenizers::Tokenizer;

#[cfg(feature = "clip")]
use crate::scorer::softmax;

#[cfg(feature = "clip")]
const IMAGE_SIZE: usize = 224;
#[cfg(feature = "clip")]
const MAX_TOKENS: usize = 77;
#[cfg(feature = "clip")]
const END_OF_TEXT: &str = "<|endoftext|>";
#[cfg(feature = "clip")]
const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
#[cfg(feature = "clip")]
const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_1];

#[cfg(feature = "clip")]
pub struct ClipScorer {
    model: ClipModel,
    tokenizer: Tokenizer,
    device: Device,
    pad_id: u32,
}

#[cfg(feature = "clip")]
fn inference(e: candle_core::Error) -> ScorerError {
    ScorerError::Inference(e.to_string())
}

#[cfg(feature = "clip")]
impl ClipScorer {
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self, ScorerError> {
        let model_dir = model_dir.as_ref();
        let weights = model_dir.join("model.safetensors");
        let tokenizer_file = model_dir.join("tokenizer.json");

        for required in [&weights, &tokenizer_file] {
            if !required.exists() {
                return Err(ScorerError::ModelNotFound(required.display().to_string()));
            }
        }

        let tokenizer = Tokenizer::from_file(&tokenizer_file)
            .map_err(|e| ScorerError::ModelLoad(e.to_string()))?;
        let pad_id = tokenizer.token_to_id(END_OF_TEXT).ok_or_else(|| {
            ScorerError::ModelLoad(format!("tokenizer has no {} token", END_OF_TEXT))
        })?;

        let device = Device::Cpu;
        let config = ClipConfig::vit_base_patch32();
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)
                .map_err(|e| ScorerError::ModelLoad(e.to_string()))?
        };
        let model =
            ClipModel::new(vb, &config).map_err(|e| ScorerError::ModelLoad(e.to_string()))?;

        info!("Loaded CLIP model from {}", model_dir.display());

        Ok(Self {
            model,
            tokenizer,
            device,
            pad_id,
        })
    }

    fn pixel_values(&self, canvas: &Canvas) -> Result<Tensor, ScorerError> {
        let rgb = DynamicImage::ImageLuma8(canvas.image().clone())
            .resize_to_fill(IMAGE_SIZE as u32, IMAGE_SIZE as u32, FilterType::CatmullRom)
            .to_rgb8();

        let mean = Tensor::new(&CLIP_MEAN, &self.device)
            .and_then(|t| t.reshape((3, 1, 1)))
            .map_err(inference)?;
        let std = Tensor::new(&CLIP_STD, &self.device)
            .and_then(|t| t.reshape((3, 1, 1)))
            .map_err(inference)?;

        Tensor::from_vec(rgb.into_raw(), (IMAGE_SIZE, IMAGE_SIZE, 3), &self.device)
            .and_then(|t| t.permute((2, 0, 1)))
            .and_then(|t| t.to_dtype(DType::F32))
            .and_then(|t| t.affine(1.0 / 255.0, 0.0))
            .and_then(|t| t.broadcast_sub(&mean))
            .and_then(|t| t.broadcast_div(&std))
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference)
    }

    fn input_ids(&self, labels: &[String]) -> Result<Tensor, ScorerError> {
        let mut sequences = Vec::with_capacity(labels.len());
        for label in labels {
            let encoding = self
                .tokenizer
                .encode(label.as_str(), true)
                .map_err(|e| ScorerError::Inference(e.to_string()))?;
            let mut ids = encoding.get_ids().to_vec();
            ids.truncate(MAX_TOKENS);
            sequences.push(ids);
        }

        let width = sequences.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let mut flat = Vec::with_capacity(sequences.len() * width);
        for mut ids in sequences {
            ids.resize(width, self.pad_id);
            flat.extend(ids);
        }

        Tensor::from_vec(flat, (labels.len(), width), &self.device).map_err(inference)
    }
}

#[cfg(feature = "clip")]
impl SimilarityScorer for ClipScorer {
    fn score(&self, image: &Canvas, labels: &[String]) -> Result<Vec<f64>, ScorerError> {
        let pixel_values = self.pixel_values(image)?;
        let input_ids = self.input_ids(labels)?;

        let (_logits_per_text, logits_per_image) = self
            .model
            .forward(&pixel_values, &input_ids)
            .map_err(inference)?;
        let logits = logits_per_image
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(inference)?;

        Ok(softmax(&logits))
    }
}

/// Stub used when the `clip` feature is disabled.
#[cfg(not(feature = "clip"))]
pub struct ClipScorer {
    _private: (),
}

#[cfg(not(feature = "clip"))]
impl ClipScorer {
    pub fn load(_model_dir: impl AsRef<Path>) -> Result<Self, ScorerError> {
        Err(ScorerError::FeatureDisabled("clip".into()))
    }
}

#[cfg(not(feature = "clip"))]
impl SimilarityScorer for ClipScorer {
    fn score(&self, _image: &Canvas, _labels: &[String]) -> Result<Vec<f64>, ScorerError> {
        Err(ScorerError::FeatureDisabled("clip".into()))
    }
}
