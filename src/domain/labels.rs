// ============================================================
// Layer 3 — Class Labels and Decision Rule
// ============================================================
// The classifier is strictly binary. Labels come from the
// class subfolder names sorted alphabetically:
//
//   data/images/
//     nosignal/   → label 0
//     signal/     → label 1
//
// The mapping is persisted next to the model (labels.json) so
// a renamed folder can never silently flip the meaning of a
// prediction.
//
// The decision rule on the sigmoid score is fixed:
//   score >  threshold → "no signal"
//   score <= threshold → "signal"

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Default decision threshold on the sigmoid output.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Sorted class names; the index of a name is its label.
/// Serialised as a plain JSON list, validated on the way back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassLabels {
    names: Vec<String>,
}

impl TryFrom<Vec<String>> for ClassLabels {
    type Error = anyhow::Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::from_names(names)
    }
}

impl From<ClassLabels> for Vec<String> {
    fn from(labels: ClassLabels) -> Self {
        labels.names
    }
}

impl ClassLabels {
    /// Build the label map from discovered class folder names.
    /// Names are sorted so the label order never depends on
    /// directory listing order. Exactly two classes are required.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();

        if names.len() != 2 {
            bail!(
                "Expected exactly 2 class folders, found {}: {:?}",
                names.len(),
                names
            );
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Class name for a label, if the label is in range.
    pub fn name(&self, label: usize) -> Option<&str> {
        self.names.get(label).map(String::as_str)
    }

    /// The class the sigmoid output measures membership of (label 1).
    pub fn positive(&self) -> &str {
        &self.names[1]
    }
}

// ─── Verdict ─────────────────────────────────────────────────────────────────
/// Human-readable decision for a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Signal,
    NoSignal,
}

impl Verdict {
    /// Apply the fixed decision rule to a sigmoid score.
    pub fn from_score(score: f32, threshold: f32) -> Self {
        if score > threshold {
            Verdict::NoSignal
        } else {
            Verdict::Signal
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Signal   => write!(f, "Image has signal"),
            Verdict::NoSignal => write!(f, "Image has no signal"),
        }
    }
}

/// A scored image: raw sigmoid output plus the decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub score:   f32,
    pub verdict: Verdict,
}

impl Prediction {
    pub fn new(score: f32, threshold: f32) -> Self {
        Self { score, verdict: Verdict::from_score(score, threshold) }
    }
}
