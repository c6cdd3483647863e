// ============================================================
// Layer 4 — Image Validator
// ============================================================
// A reporting-only pass over the image tree:
//
//   data_dir/
//     <class>/
//       <file>         ← every file is checked
//       <sub>/<file>   ← nested folders too
//
// For each file:
//   1. Read the raw bytes           → failure: "Issue with image"
//   2. Sniff the format from bytes  → not jpeg/jpg/bmp/png:
//                                     "Image not in extension list"
//   3. Fully decode the image       → failure: "Issue with image"
//
// Every offending file produces exactly ONE issue and one
// warning line. Nothing is deleted and an offending file never
// makes the pass fail; only a missing root directory does.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

/// Formats accepted by the validator, as returned by `detect_format`.
pub const ALLOWED_FORMATS: [&str; 4] = ["jpeg", "jpg", "bmp", "png"];

/// Why a single file was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// Detected format is outside the allow-list (None = not an image)
    UnsupportedFormat { detected: Option<String> },
    /// The file could not be read or decoded
    Unreadable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageIssue {
    pub path: PathBuf,
    pub kind: IssueKind,
}

impl fmt::Display for ImageIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::UnsupportedFormat { .. } => {
                write!(f, "Image not in extension list {}", self.path.display())
            }
            IssueKind::Unreadable { .. } => {
                write!(f, "Issue with image {}", self.path.display())
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of files inspected
    pub checked: usize,
    /// One entry per offending file
    pub issues: Vec<ImageIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Name a sniffed image format the way the allow-list spells it.
pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png  => "png".to_string(),
        ImageFormat::Bmp  => "bmp".to_string(),
        ImageFormat::Gif  => "gif".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        other => other
            .extensions_str()
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| format!("{other:?}").to_lowercase()),
    }
}

/// Sniff the image format from the leading bytes.
pub fn detect_format(bytes: &[u8]) -> Option<String> {
    image::guess_format(bytes).ok().map(format_name)
}

pub struct ImageValidator {
    root: PathBuf,
}

impl ImageValidator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Inspect every file of every class folder.
    pub fn run(&self) -> Result<ValidationReport> {
        if !self.root.is_dir() {
            bail!("Image directory '{}' does not exist", self.root.display());
        }

        let mut report = ValidationReport::default();

        for class_entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let class_entry = class_entry?;
            if !class_entry.file_type().is_dir() {
                tracing::debug!("Skipping non-directory '{}'", class_entry.path().display());
                continue;
            }

            for entry in WalkDir::new(class_entry.path()).min_depth(1).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_dir() {
                    continue;
                }

                report.checked += 1;
                if let Some(issue) = check_file(entry.path()) {
                    tracing::warn!("{}", issue);
                    report.issues.push(issue);
                }
            }
        }

        tracing::info!(
            "Validated {} files under '{}': {} issue(s)",
            report.checked,
            self.root.display(),
            report.issues.len()
        );
        Ok(report)
    }
}

/// Check a single file; `None` means the file is fine.
fn check_file(path: &Path) -> Option<ImageIssue> {
    let issue = |kind| Some(ImageIssue { path: path.to_path_buf(), kind });

    let bytes = match fs::read(path) {
        Ok(b)  => b,
        Err(e) => return issue(IssueKind::Unreadable { reason: e.to_string() }),
    };

    let detected = detect_format(&bytes);
    let allowed  = detected
        .as_deref()
        .is_some_and(|f| ALLOWED_FORMATS.contains(&f));
    if !allowed {
        return issue(IssueKind::UnsupportedFormat { detected });
    }

    match image::load_from_memory(&bytes) {
        Ok(_)  => None,
        Err(e) => issue(IssueKind::Unreadable { reason: e.to_string() }),
    }
}
