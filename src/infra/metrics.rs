// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average binary cross-entropy over training batches
//   - train_acc:  fraction of training samples classified correctly
//   - val_loss:   average binary cross-entropy on the validation share
//   - val_acc:    fraction of validation samples classified correctly
//
// Output file: <log_dir>/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,train_acc,val_loss,val_acc
//   1,0.693100,0.512000,0.688400,0.540000
//   2,0.612900,0.655000,0.590100,0.700000
//
// Rows are appended, so several runs against the same log
// directory accumulate in one file.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str = "epoch,train_loss,train_acc,val_loss,val_acc";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average loss over all training batches
    pub train_loss: f64,

    /// Range: [0.0, 1.0]
    pub train_acc: f64,

    /// Average loss on the validation share (NaN when it is empty)
    pub val_loss: f64,

    /// Range: [0.0, 1.0]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        train_loss: f64,
        train_acc:  f64,
        val_loss:   f64,
        val_acc:    f64,
    ) -> Self {
        Self { epoch, train_loss, train_acc, val_loss, val_acc }
    }

    /// Returns true if this epoch beat the previous best validation accuracy
    pub fn is_improvement(&self, best_val_acc: f64) -> bool {
        self.val_acc > best_val_acc
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6}",
            self.epoch, self.train_loss, self.train_acc, self.val_loss, self.val_acc,
        )
    }
}

// ─── TrainingHistory ──────────────────────────────────────────────────────────
/// All epoch rows of one run, in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn push(&mut self, m: EpochMetrics) {
        self.epochs.push(m);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    /// Training accuracy per epoch
    pub fn accuracy(&self) -> Vec<f64> {
        self.epochs.iter().map(|m| m.train_acc).collect()
    }

    /// Validation accuracy per epoch
    pub fn val_accuracy(&self) -> Vec<f64> {
        self.epochs.iter().map(|m| m.val_acc).collect()
    }

    /// Epoch with the highest validation accuracy (first one on ties)
    pub fn best_epoch(&self) -> Option<&EpochMetrics> {
        let mut best: Option<&EpochMetrics> = None;
        for m in &self.epochs {
            if best.map_or(true, |b| m.is_improvement(b.val_acc)) {
                best = Some(m);
            }
        }
        best
    }
}

// ─── MetricsLogger ────────────────────────────────────────────────────────────
/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the log directory and write the CSV header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 0.5, 0.8, 0.6, 0.7);
        assert!(m.is_improvement(0.6));
        assert!(!m.is_improvement(0.7));
    }

    #[test]
    fn test_history_series_and_best_epoch() {
        let mut h = TrainingHistory::default();
        h.push(EpochMetrics::new(1, 0.7, 0.50, 0.69, 0.40));
        h.push(EpochMetrics::new(2, 0.5, 0.75, 0.55, 0.80));
        h.push(EpochMetrics::new(3, 0.4, 0.85, 0.60, 0.80));

        assert_eq!(h.accuracy(),     vec![0.50, 0.75, 0.85]);
        assert_eq!(h.val_accuracy(), vec![0.40, 0.80, 0.80]);
        assert_eq!(h.best_epoch().unwrap().epoch, 2);
        assert_eq!(h.last().unwrap().epoch, 3);
    }

    #[test]
    fn test_logger_appends_rows_after_header() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().join("logs")).unwrap();
        logger.log(&EpochMetrics::new(1, 0.5, 0.25, 0.75, 1.0)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.25, 0.5, 0.5, 1.0)).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "1,0.500000,0.250000,0.750000,1.000000");
        assert_eq!(lines.len(), 3);

        // A second logger on the same dir keeps the existing rows
        let again = MetricsLogger::new(dir.path().join("logs")).unwrap();
        again.log(&EpochMetrics::new(3, 0.1, 0.9, 0.2, 1.0)).unwrap();
        let text = fs::read_to_string(again.csv_path()).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}
