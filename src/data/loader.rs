// ============================================================
// Layer 4 — Image Folder Loader
// ============================================================
// Builds the labelled dataset straight from the directory tree:
//
//   data/images/
//     nosignal/ img1.png img2.jpg ...   → label 0
//     signal/   img9.png ...            → label 1
//
// Class folders are sorted by name, so label order never
// depends on the OS directory listing. Inside a class, files
// are also sorted by name. Subfolders of a class folder are
// walked too; their images belong to that class.
//
// Only files with a loadable extension are picked up:
//   bmp, gif, jpeg, jpg, png   (case-insensitive)
// Anything else (notes, thumbnails.db, ...) is ignored here;
// the validator is where such files get reported.
//
// Each picked file is decoded and resized once. A file that
// cannot be decoded aborts the whole stage with an error that
// names it.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::data::dataset::ImageSample;
use crate::data::preprocessor::Preprocessor;
use crate::domain::labels::ClassLabels;
use crate::domain::sample::ImageRecord;
use crate::domain::traits::ImageSource;

/// Extensions the dataset builder loads.
pub const LOADABLE_EXTENSIONS: [&str; 5] = ["bmp", "gif", "jpeg", "jpg", "png"];

pub struct ImageFolderLoader {
    /// Root directory holding one subfolder per class
    root: PathBuf,
}

impl ImageFolderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Sorted names of the class subfolders.
    fn class_dirs(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            bail!("Image directory '{}' does not exist", self.root.display());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry
                .with_context(|| format!("Cannot read directory '{}'", self.root.display()))?;
            if entry.file_type().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    /// Decode and resize every record.
    pub fn load_samples(
        &self,
        records:      &[ImageRecord],
        preprocessor: &Preprocessor,
    ) -> Result<Vec<ImageSample>> {
        let mut samples = Vec::with_capacity(records.len());

        for record in records {
            let img = preprocessor
                .load(&record.path)
                .with_context(|| format!("Dataset build failed on '{}'", record.path.display()))?;

            samples.push(ImageSample {
                pixels: img.into_raw(),
                label:  record.label,
            });
        }

        tracing::info!("Decoded {} images at {}x{}",
            samples.len(), preprocessor.image_size(), preprocessor.image_size());
        Ok(samples)
    }
}

fn has_loadable_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| LOADABLE_EXTENSIONS.contains(&e.as_str()))
}

impl ImageSource for ImageFolderLoader {
    fn labels(&self) -> Result<ClassLabels> {
        ClassLabels::from_names(self.class_dirs()?)
            .with_context(|| format!("Bad class layout in '{}'", self.root.display()))
    }

    fn records(&self) -> Result<Vec<ImageRecord>> {
        let labels      = self.labels()?;
        let mut records = Vec::new();

        for (label, class_name) in labels.names().iter().enumerate() {
            let class_dir = self.root.join(class_name);

            for entry in WalkDir::new(&class_dir).min_depth(1).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Cannot read directory '{}'", class_dir.display()))?;
                let path  = entry.path();

                if entry.file_type().is_dir() {
                    continue;
                }
                if entry.file_type().is_file() && has_loadable_extension(path) {
                    records.push(ImageRecord::new(path, class_name.as_str(), label));
                } else {
                    tracing::debug!("Not loading '{}'", path.display());
                }
            }
        }

        if records.is_empty() {
            bail!("No loadable images found under '{}'", self.root.display());
        }

        for (label, name) in labels.names().iter().enumerate() {
            let count = records.iter().filter(|r| r.label == label).count();
            tracing::info!("Class {} = '{}' ({} images)", label, name, count);
        }

        Ok(records)
    }
}
