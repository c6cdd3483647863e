// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Scores a single image with a trained model:
//
//   file → decode → RGB → resize → ÷255 → CHW → [1, 3, S, S]
//        → forward → sigmoid score → thresholded Prediction
//
// The same Preprocessor the dataset builder uses prepares the
// image, so training and inference never drift apart.

use std::path::Path;

use anyhow::{Context, Result};
use burn::prelude::*;
use image::{DynamicImage, RgbImage};

use crate::domain::labels::Prediction;
use crate::infra::checkpoint::ModelStore;
use crate::ml::model::SignalCnn;
use crate::ml::tensor_to_scores;
use crate::data::preprocessor::{hwc_to_chw, Preprocessor, CHANNELS};

pub struct Inferencer<B: Backend> {
    model:        SignalCnn<B>,
    preprocessor: Preprocessor,
    threshold:    f32,
    device:       B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: SignalCnn<B>, image_size: usize, threshold: f32, device: B::Device) -> Self {
        Self { model, preprocessor: Preprocessor::new(image_size), threshold, device }
    }

    /// Rebuild the model saved under `store` (config first, then weights).
    pub fn from_store(store: &ModelStore, device: &B::Device) -> Result<Self> {
        let cfg   = store.load_config()?;
        let model = store.load_model::<B>(&cfg, device)?;
        tracing::info!("Model '{}' loaded for {}x{} input", cfg.model_name, cfg.image_size, cfg.image_size);
        Ok(Self::new(model, cfg.image_size, cfg.threshold, device.clone()))
    }

    /// Sigmoid score for an already prepared (resized RGB) image.
    fn score_prepared(&self, img: &RgbImage) -> Result<f32> {
        let side   = self.preprocessor.image_size();
        let pixels = hwc_to_chw(img.as_raw());

        // Batch dimension of 1
        let input = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([1, CHANNELS, side, side]);

        let scores = tensor_to_scores(self.model.forward_probs(input))?;
        scores
            .first()
            .copied()
            .context("Model returned no score")
    }

    pub fn predict_image(&self, img: &DynamicImage) -> Result<Prediction> {
        let score = self.score_prepared(&self.preprocessor.prepare(img))?;
        let prediction = Prediction::new(score, self.threshold);
        tracing::debug!("score={:.4} → {}", score, prediction.verdict);
        Ok(prediction)
    }

    pub fn predict_path(&self, path: &Path) -> Result<Prediction> {
        let img = Preprocessor::decode(path)
            .with_context(|| format!("Cannot classify '{}'", path.display()))?;
        tracing::debug!("Classifying '{}'", path.display());
        self.predict_image(&img)
    }
}
