// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits instead of the
// concrete loader and model types:
//   - ImageFolderLoader implements ImageSource
//   - PredictUseCase    implements ImageClassifier

use std::path::Path;

use anyhow::Result;

use crate::domain::labels::{ClassLabels, Prediction};
use crate::domain::sample::ImageRecord;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can enumerate labelled image files.
pub trait ImageSource {
    /// The label map the records were indexed with.
    fn labels(&self) -> Result<ClassLabels>;

    /// Every image record, ordered by class then by file name.
    fn records(&self) -> Result<Vec<ImageRecord>>;
}

// ─── ImageClassifier ──────────────────────────────────────────────────────────
/// Any component that can score a single image file.
pub trait ImageClassifier {
    fn classify(&self, path: &Path) -> Result<Prediction>;
}
