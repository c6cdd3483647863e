// ============================================================
// Layer 3 — Image Record Domain Type
// ============================================================
// One image file on disk with the class it belongs to.
// The label is the position of the class folder in sorted
// order (see labels.rs). Records are never mutated.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path of the image file
    pub path: PathBuf,

    /// Name of the parent class folder
    pub class_name: String,

    /// Binary label (0 or 1)
    pub label: usize,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>, class_name: impl Into<String>, label: usize) -> Self {
        Self {
            path:       path.into(),
            class_name: class_name.into(),
            label,
        }
    }
}
