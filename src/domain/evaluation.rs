// ============================================================
// Layer 3 — Binary Evaluation Statistics
// ============================================================
// Streaming confusion counts for a binary classifier.
// Updated once per batch, read once at the end.
//
//   precision = TP / (TP + FP)
//   recall    = TP / (TP + FN)
//   accuracy  = (TP + TN) / total
//
// Each ratio is 0.0 when its denominator is 0, so an empty
// test split reports zeros instead of NaN.
//
// A score counts as a positive prediction when it is strictly
// greater than the threshold.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfusion {
    pub true_positives:  usize,
    pub false_positives: usize,
    pub true_negatives:  usize,
    pub false_negatives: usize,
}

impl BinaryConfusion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one batch of (label, score) pairs.
    /// Extra entries in the longer slice are ignored.
    pub fn update(&mut self, labels: &[u8], scores: &[f32], threshold: f32) {
        for (&label, &score) in labels.iter().zip(scores) {
            let predicted = score > threshold;
            match (label != 0, predicted) {
                (true,  true)  => self.true_positives  += 1,
                (false, true)  => self.false_positives += 1,
                (false, false) => self.true_negatives  += 1,
                (true,  false) => self.false_negatives += 1,
            }
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Final test-split statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub precision: f64,
    pub recall:    f64,
    pub accuracy:  f64,
    pub samples:   usize,
}

impl From<&BinaryConfusion> for EvaluationSummary {
    fn from(c: &BinaryConfusion) -> Self {
        Self {
            precision: c.precision(),
            recall:    c.recall(),
            accuracy:  c.accuracy(),
            samples:   c.total(),
        }
    }
}
