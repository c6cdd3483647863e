// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores the trained classifier.
//
// What gets saved after training:
//   1. Model weights (<model_name>.mpk) — all learned parameters
//   2. train_config.json               — image size, model name, hyperparameters
//   3. labels.json                     — sorted class names (label 0, label 1)
//
// The config is needed to rebuild the exact topology (the
// dense layer width depends on the input size) before the
// weights are loaded into it.
//
// Burn's NamedMpkFileRecorder with FullPrecisionSettings:
//   - Serialises parameters to MessagePack, f32 kept as f32
//   - A reloaded model scores an image exactly like the
//     in-memory one it was saved from
//   - Type-safe: loading fails if the architecture doesn't match
//
// File layout:
//   models/
//     imageclassifier.mpk
//     train_config.json
//     labels.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::labels::ClassLabels;
use crate::ml::model::SignalCnn;

const CONFIG_FILE: &str = "train_config.json";
const LABELS_FILE: &str = "labels.json";

type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Manages everything persisted under the model directory.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Open a store rooted at `dir`. Nothing is touched on disk
    /// until something is saved.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Weight file path without extension (the recorder appends `.mpk`).
    fn model_stem(&self, model_name: &str) -> PathBuf {
        self.dir.join(model_name)
    }

    /// Weight file path as it appears on disk.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("{model_name}.mpk"))
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))
    }

    /// Save model weights to `<dir>/<model_name>.mpk`.
    pub fn save_model<B: Backend>(&self, model: &SignalCnn<B>, model_name: &str) -> Result<PathBuf> {
        self.ensure_dir()?;
        let stem = self.model_stem(model_name);

        model
            .clone()
            .save_file(stem.clone(), &ModelRecorder::new())
            .with_context(|| format!("Failed to save model to '{}'", stem.display()))?;

        let path = self.model_path(model_name);
        tracing::info!("Saved model to '{}'", path.display());
        Ok(path)
    }

    /// Rebuild the topology from the saved config and load the weights into it.
    pub fn load_model<B: Backend>(
        &self,
        cfg:    &TrainConfig,
        device: &B::Device,
    ) -> Result<SignalCnn<B>> {
        let stem  = self.model_stem(&cfg.model_name);
        let model = cfg.model_config().init::<B>(device);

        let model = model
            .load_file(stem.clone(), &ModelRecorder::new(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained the model first?",
                    self.model_path(&cfg.model_name).display())
            })?;

        tracing::info!("Loaded model from '{}'", self.model_path(&cfg.model_name).display());
        Ok(model)
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    pub fn save_labels(&self, labels: &ClassLabels) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(LABELS_FILE);
        let json = serde_json::to_string_pretty(labels)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write labels to '{}'", path.display()))?;

        tracing::debug!("Saved class labels to '{}'", path.display());
        Ok(())
    }

    pub fn load_labels(&self) -> Result<ClassLabels> {
        let path = self.dir.join(LABELS_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read labels from '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed labels in '{}'", path.display()))
    }
}
