// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Loads the saved model (config → topology → weights) plus
// the class labels, then classifies single image files.

use std::path::Path;

use anyhow::Result;
use burn::tensor::backend::Backend;

use crate::domain::{
    labels::{ClassLabels, Prediction},
    traits::ImageClassifier,
};
use crate::infra::checkpoint::ModelStore;
use crate::ml::{inferencer::Inferencer, InferBackend};

pub struct PredictUseCase<B: Backend = InferBackend> {
    labels:     ClassLabels,
    inferencer: Inferencer<B>,
}

impl<B: Backend> PredictUseCase<B> {
    /// Load the model saved in `model_dir` onto `device`.
    pub fn load(model_dir: impl AsRef<Path>, device: &B::Device) -> Result<Self> {
        let store      = ModelStore::new(model_dir.as_ref());
        let labels     = store.load_labels()?;
        let inferencer = Inferencer::from_store(&store, device)?;
        Ok(Self { labels, inferencer })
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }
}

impl<B: Backend> ImageClassifier for PredictUseCase<B> {
    fn classify(&self, path: &Path) -> Result<Prediction> {
        self.inferencer.predict_path(path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::data::fixtures::write_image;
    use burn::backend::NdArray;
    use image::ImageFormat;

    type TestBackend = NdArray;

    #[test]
    fn test_classifies_with_saved_model() {
        let dir    = tempfile::tempdir().unwrap();
        let store  = ModelStore::new(dir.path().join("models"));
        let cfg    = TrainConfig { image_size: 24, ..TrainConfig::default() };
        let device = Default::default();

        let model = cfg.model_config().init::<TestBackend>(&device);
        store.save_config(&cfg).unwrap();
        store.save_labels(&ClassLabels::from_names(["signal", "nosignal"]).unwrap()).unwrap();
        store.save_model(&model, &cfg.model_name).unwrap();

        let image = dir.path().join("sample.jpg");
        write_image(&image, [120, 60, 30], 40, ImageFormat::Jpeg);

        let use_case   = PredictUseCase::<TestBackend>::load(store.dir(), &device).unwrap();
        let prediction = use_case.classify(&image).unwrap();

        assert!((0.0..=1.0).contains(&prediction.score));
        assert_eq!(use_case.labels().positive(), "signal");
    }

    #[test]
    fn test_untrained_model_dir_is_an_error() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        assert!(PredictUseCase::<TestBackend>::load(dir.path(), &device).is_err());
    }
}
