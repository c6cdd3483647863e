// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the image tree         (Layer 4 - data)
//   Step 2: Discover classes and records    (Layer 4 - data)
//   Step 3: Decode + resize every image     (Layer 4 - data)
//   Step 4: Seeded shuffle, batch split     (Layer 4 - data)
//   Step 5: Run training loop               (Layer 5 - ml)
//   Step 6: Evaluate on the test share      (Layer 5 - ml)
//   Step 7: Save model, config and labels   (Layer 6 - infra)
//   Step 8: Optional demo prediction, before and after reload
//
// Nothing is written to the model directory until training and
// evaluation have succeeded, so a failed run leaves the previous
// model, config and labels untouched.
//
// Reference: Burn Book §5 (Training)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use burn::tensor::backend::{AutodiffBackend, Backend};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ImageDataset,
    loader::ImageFolderLoader,
    preprocessor::Preprocessor,
    splitter::{batch_count, partition, shuffle_seeded, BatchSplit, SplitFractions},
    validator::{ImageValidator, ValidationReport},
};
use crate::domain::{
    evaluation::EvaluationSummary,
    labels::{ClassLabels, Prediction, DEFAULT_THRESHOLD},
    traits::ImageSource,
};
use crate::infra::{
    checkpoint::ModelStore,
    metrics::{MetricsLogger, TrainingHistory},
};
use crate::ml::{
    evaluator::evaluate,
    inferencer::Inferencer,
    model::{SignalCnnConfig, MIN_IMAGE_SIZE},
    cpu_device, gpu_device, trainer, CpuTrainBackend, TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All paths and hyperparameters for a training run.
// Saved next to the model so inference rebuilds the same topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Root with one subfolder per class
    pub data_dir:   PathBuf,
    pub model_dir:  PathBuf,
    /// Where metrics.csv is appended
    pub log_dir:    PathBuf,
    /// Weights are saved as <model_dir>/<model_name>.mpk
    pub model_name: String,
    pub batch_size: usize,
    pub epochs:     usize,
    pub lr:         f64,
    /// Images are resized to image_size × image_size
    pub image_size: usize,
    pub fractions:  SplitFractions,
    /// Decision threshold on the sigmoid score
    pub threshold:  f32,
    /// Drives both the dataset shuffle and the per-epoch reshuffle
    pub seed:       u64,
    /// Image scored after training, before and after reloading the model
    pub demo_image: Option<PathBuf>,
    pub use_cpu:    bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:   PathBuf::from("data/images"),
            model_dir:  PathBuf::from("models"),
            log_dir:    PathBuf::from("logs"),
            model_name: "imageclassifier".to_string(),
            batch_size: 10,
            epochs:     20,
            lr:         1e-3,
            image_size: 256,
            fractions:  SplitFractions::default(),
            threshold:  DEFAULT_THRESHOLD,
            seed:       42,
            demo_image: None,
            use_cpu:    false,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> SignalCnnConfig {
        SignalCnnConfig::new().with_image_size(self.image_size)
    }

    /// Reject settings that would fail later in the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if self.image_size < MIN_IMAGE_SIZE {
            bail!("image_size must be at least {MIN_IMAGE_SIZE}, got {}", self.image_size);
        }
        if !(self.lr > 0.0) {
            bail!("learning rate must be positive, got {}", self.lr);
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            bail!("threshold must be within [0, 1], got {}", self.threshold);
        }
        let f = &self.fractions;
        if [f.train, f.val, f.test].iter().any(|v| !v.is_finite() || *v < 0.0 || *v > 1.0) {
            bail!("split fractions must be finite and within [0, 1], got {f:?}");
        }
        if self.model_name.trim().is_empty() {
            bail!("model_name must not be empty");
        }
        Ok(())
    }
}

// ─── Outcome ──────────────────────────────────────────────────────────────────
/// Demo prediction with the in-memory model and with the reloaded one.
#[derive(Debug, Clone)]
pub struct DemoCheck {
    pub image:     PathBuf,
    pub in_memory: Prediction,
    pub reloaded:  Prediction,
}

impl DemoCheck {
    pub fn consistent(&self) -> bool {
        (self.in_memory.score - self.reloaded.score).abs() <= 1e-6
            && self.in_memory.verdict == self.reloaded.verdict
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub labels:     ClassLabels,
    pub validation: ValidationReport,
    pub split:      BatchSplit,
    pub history:    TrainingHistory,
    pub evaluation: EvaluationSummary,
    pub model_path: PathBuf,
    pub demo:       Option<DemoCheck>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full pipeline on the wgpu backend, or on NdArray with `use_cpu`.
    pub fn execute(&self) -> Result<TrainOutcome> {
        if self.config.use_cpu {
            self.execute_on::<CpuTrainBackend>(&cpu_device())
        } else {
            self.execute_on::<TrainBackend>(&gpu_device())
        }
    }

    /// Execute the full pipeline on any autodiff backend.
    pub fn execute_on<B: AutodiffBackend>(&self, device: &B::Device) -> Result<TrainOutcome> {
        let cfg = &self.config;
        cfg.validate().context("Invalid training configuration")?;

        // ── Step 1: Validate the image tree ───────────────────────────────────
        tracing::info!("Validating images in '{}'", cfg.data_dir.display());
        let validation = ImageValidator::new(&cfg.data_dir)
            .run()
            .context("Image validation failed")?;
        tracing::info!(
            "Checked {} files, {} flagged",
            validation.checked, validation.issues.len()
        );

        // ── Step 2: Discover classes and image records ────────────────────────
        let loader  = ImageFolderLoader::new(&cfg.data_dir);
        let labels  = loader.labels()?;
        let records = loader.records().context("Dataset build failed")?;

        // ── Step 3: Decode + resize ───────────────────────────────────────────
        let preprocessor = Preprocessor::new(cfg.image_size);
        let mut samples  = loader.load_samples(&records, &preprocessor)?;

        // ── Step 4: Shuffle once, then split by batch count ───────────────────
        shuffle_seeded(&mut samples, cfg.seed);
        let batches = batch_count(samples.len(), cfg.batch_size);
        let split   = BatchSplit::plan(batches, &cfg.fractions);
        tracing::info!(
            "{} batches of {}: {} train, {} validation, {} test",
            batches, cfg.batch_size, split.train, split.val, split.test
        );

        let (train_samples, val_samples, test_samples) =
            partition(samples, cfg.batch_size, &split);
        let train_dataset = ImageDataset::new(train_samples);
        let val_dataset   = ImageDataset::new(val_samples);
        let test_dataset  = ImageDataset::new(test_samples);
        tracing::info!("Training class counts: {:?}", train_dataset.class_counts());

        // ── Step 5: Train ─────────────────────────────────────────────────────
        let logger = MetricsLogger::new(&cfg.log_dir)?;
        let (model, history) = trainer::train::<B>(cfg, train_dataset, val_dataset, &logger, device)
            .context("Training failed")?;

        // ── Step 6: Evaluate on the held-out test share ───────────────────────
        let evaluation = evaluate(
            &model, test_dataset, cfg.image_size, cfg.batch_size, cfg.threshold, device,
        )
        .context("Evaluation failed")?;
        tracing::info!(
            "Test precision={:.3} recall={:.3} accuracy={:.3} over {} samples",
            evaluation.precision, evaluation.recall, evaluation.accuracy, evaluation.samples
        );

        // ── Step 7: Save model, config and labels for inference ───────────────
        let store      = ModelStore::new(&cfg.model_dir);
        let model_path = store.save_model(&model, &cfg.model_name)?;
        store.save_config(cfg)?;
        store.save_labels(&labels)?;
        tracing::info!("Model, config and labels saved to '{}'", store.dir().display());

        // ── Step 8: Demo prediction with the fresh and the reloaded model ─────
        let demo = match &cfg.demo_image {
            Some(image) => {
                let fresh = Inferencer::new(model, cfg.image_size, cfg.threshold, device.clone());
                Some(demo_check::<B::InnerBackend>(&fresh, &store, image, device)?)
            }
            None => None,
        };

        Ok(TrainOutcome { labels, validation, split, history, evaluation, model_path, demo })
    }
}

fn demo_check<B: Backend>(
    fresh:  &Inferencer<B>,
    store:  &ModelStore,
    image:  &Path,
    device: &B::Device,
) -> Result<DemoCheck> {
    let in_memory = fresh.predict_path(image).context("Demo prediction failed")?;

    let reloaded_model = Inferencer::<B>::from_store(store, device)
        .context("Reloading the saved model failed")?;
    let reloaded = reloaded_model.predict_path(image).context("Demo prediction failed")?;

    let check = DemoCheck { image: image.to_path_buf(), in_memory, reloaded };
    if !check.consistent() {
        tracing::warn!(
            "Reloaded model disagrees: {:.6} vs {:.6}",
            check.in_memory.score, check.reloaded.score
        );
    }
    Ok(check)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::predict_use_case::PredictUseCase;
    use crate::data::fixtures::write_class_tree;
    use crate::domain::traits::ImageClassifier;
    use burn::backend::{Autodiff, NdArray};
    use std::fs;

    type TestBackend = Autodiff<NdArray>;

    fn tiny_config(root: &Path) -> TrainConfig {
        TrainConfig {
            data_dir:   root.join("images"),
            model_dir:  root.join("models"),
            log_dir:    root.join("logs"),
            batch_size: 2,
            epochs:     2,
            image_size: 24,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let base = TrainConfig::default();
        assert!(TrainConfig { batch_size: 0, ..base.clone() }.validate().is_err());
        assert!(TrainConfig { epochs: 0, ..base.clone() }.validate().is_err());
        assert!(TrainConfig { image_size: 21, ..base.clone() }.validate().is_err());
        assert!(TrainConfig { lr: 0.0, ..base.clone() }.validate().is_err());
        let fractions = SplitFractions { train: 0.7, val: -0.2, test: 0.1 };
        assert!(TrainConfig { fractions, ..base }.validate().is_err());
    }

    #[test]
    fn test_out_of_range_fractions_are_rejected() {
        let base = TrainConfig::default();
        for bad in [1e30, 1.5, f64::INFINITY, f64::NAN] {
            let fractions = SplitFractions { train: 0.7, val: bad, test: 0.1 };
            assert!(TrainConfig { fractions, ..base.clone() }.validate().is_err(), "val={bad}");
        }
        let fractions = SplitFractions { train: 1.0, val: 0.0, test: 0.0 };
        assert!(TrainConfig { fractions, ..base }.validate().is_ok());
    }

    #[test]
    fn test_config_json_keeps_missing_fields_at_default() {
        let cfg: TrainConfig = serde_json::from_str(r#"{"image_size": 64}"#).unwrap();
        assert_eq!(cfg.image_size, 64);
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.model_name, "imageclassifier");
    }

    #[test]
    fn test_end_to_end_training_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = tiny_config(dir.path());
        // 40 images at batch size 2 → 20 batches → 14 / 5 / 1
        write_class_tree(
            &cfg.data_dir,
            &[("nosignal", [20, 20, 20], 20), ("signal", [230, 230, 230], 20)],
            32,
        );
        fs::write(cfg.data_dir.join("signal/readme.txt"), "not an image").unwrap();
        cfg.demo_image = Some(cfg.data_dir.join("signal/img_0.png"));

        let device  = Default::default();
        let outcome = TrainUseCase::new(cfg.clone()).execute_on::<TestBackend>(&device).unwrap();

        assert_eq!(outcome.labels.names(), ["nosignal", "signal"]);
        assert_eq!(outcome.validation.checked, 41);
        assert_eq!(outcome.validation.issues.len(), 1);
        assert_eq!(outcome.split, BatchSplit { train: 14, val: 5, test: 1 });
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(outcome.evaluation.samples, 2);
        assert!((0.0..=1.0).contains(&outcome.evaluation.accuracy));

        assert!(outcome.model_path.exists());
        assert!(cfg.model_dir.join("train_config.json").exists());
        assert!(cfg.model_dir.join("labels.json").exists());
        assert!(cfg.log_dir.join("metrics.csv").exists());

        let demo = outcome.demo.unwrap();
        assert!(demo.consistent());
        assert!((0.0..=1.0).contains(&demo.in_memory.score));
    }

    #[test]
    fn test_failed_run_keeps_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let first = tiny_config(dir.path());
        write_class_tree(
            &first.data_dir,
            &[("nosignal", [20, 20, 20], 10), ("signal", [230, 230, 230], 10)],
            32,
        );
        let device = Default::default();
        TrainUseCase::new(first.clone()).execute_on::<TestBackend>(&device).unwrap();

        // One image per class → one batch, all of it validation → training fails
        let second = TrainConfig {
            data_dir: dir.path().join("pets"),
            epochs:   3,
            ..first.clone()
        };
        write_class_tree(&second.data_dir, &[("cat", [200, 120, 40], 1), ("dog", [60, 60, 60], 1)], 32);
        assert!(TrainUseCase::new(second).execute_on::<TestBackend>(&device).is_err());

        let store = ModelStore::new(&first.model_dir);
        assert_eq!(store.load_labels().unwrap().names(), ["nosignal", "signal"]);
        assert_eq!(store.load_config().unwrap().data_dir, first.data_dir);
        assert_eq!(store.load_config().unwrap().epochs, 2);

        let image = first.data_dir.join("signal/img_0.png");
        let use_case = PredictUseCase::<NdArray>::load(
            &first.model_dir,
            &device,
        )
        .unwrap();
        assert!((0.0..=1.0).contains(&use_case.classify(&image).unwrap().score));
    }

    #[test]
    fn test_cpu_flag_trains_on_ndarray() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { use_cpu: true, epochs: 1, ..tiny_config(dir.path()) };
        write_class_tree(
            &cfg.data_dir,
            &[("nosignal", [20, 20, 20], 6), ("signal", [230, 230, 230], 6)],
            32,
        );

        let outcome = TrainUseCase::new(cfg).execute().unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert!(outcome.model_path.exists());
    }

    #[test]
    fn test_missing_data_dir_fails_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        let device = Default::default();
        assert!(TrainUseCase::new(cfg.clone()).execute_on::<TestBackend>(&device).is_err());
        assert!(!cfg.model_dir.exists());
    }
}
