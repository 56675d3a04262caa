// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Why log metrics to CSV?
//   - Easy to open in a spreadsheet or pandas
//   - Can plot learning curves per fold to diagnose training
//   - Provides a permanent record of each run
//
// Metrics recorded per epoch:
//   - fold:       which cross-validation fold was training
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average MSE over the fold's training batches
//   - test_loss:  average MSE on the fold's held-out genomes
//
// Output file: {out_dir}/metrics.csv
//
// Example CSV output:
//   fold,epoch,train_loss,test_loss
//   0,1,0.312450,0.289200
//   0,2,0.289010,0.285430
//   ...
//
// How to read the metrics:
//   - Loss should decrease each epoch (model is learning)
//   - test_loss rising while train_loss falls → overfitting
//   - Folds with much worse test_loss than the rest usually
//     mean an unlucky class split, not a code problem
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Which fold was held out while this epoch trained
    pub fold: usize,

    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average MSE over all training batches.
    /// With 0/1 targets, an untrained model sits near 0.25
    pub train_loss: f64,

    /// Average MSE on the held-out genomes.
    /// Should track train_loss — divergence indicates overfitting
    pub test_loss: f64,
}

impl EpochMetrics {
    pub fn new(fold: usize, epoch: usize, train_loss: f64, test_loss: f64) -> Self {
        Self {
            fold,
            epoch,
            train_loss,
            test_loss,
        }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Starts a fresh file per run — one run, one learning curve.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");

        let mut f = fs::File::create(&csv_path)?;
        writeln!(f, "fold,epoch,train_loss,test_loss")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        // Open in append mode — adds to end of file
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{:.6},{:.6}",
            m.fold, m.epoch, m.train_loss, m.test_loss,
        )?;

        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows_written() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(0, 1, 0.25, 0.26)).unwrap();
        logger.log(&EpochMetrics::new(0, 2, 0.20, 0.22)).unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "fold,epoch,train_loss,test_loss");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0,1,0.25"));
    }

    #[test]
    fn test_new_run_truncates_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let first = MetricsLogger::new(dir.path()).unwrap();
        first.log(&EpochMetrics::new(0, 1, 0.25, 0.26)).unwrap();

        let second = MetricsLogger::new(dir.path()).unwrap();
        let content = fs::read_to_string(second.csv_path()).unwrap();
        assert_eq!(content.lines().count(), 1, "only the header should remain");
    }
}
