// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per training epoch.
//
// Metrics recorded per epoch:
//   - epoch:       the epoch number (1, 2, 3, ...)
//   - train_loss:  mean cross-entropy over the epoch's train batches
//   - train_acc:   running accuracy over the epoch's train batches
//   - eval_loss:   mean cross-entropy over the evaluation batches
//   - eval_acc:    accuracy over all evaluation samples
//   - global_step: optimiser steps applied so far
//
// Output file: <output_dir>/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,train_acc,eval_loss,eval_acc,global_step
//   1,9.071200,0.000000,9.068400,0.000000,16
//   2,9.064100,0.000000,9.066900,0.000000,32

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: &str = "epoch,train_loss,train_acc,eval_loss,eval_acc,global_step";

/// One row of metrics data for a single epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:       usize,
    pub train_loss:  f64,
    pub train_acc:   f64,
    pub eval_loss:   f64,
    pub eval_acc:    f64,
    pub global_step: u64,
}

impl EpochMetrics {
    pub fn new(
        epoch:       usize,
        train_loss:  f64,
        train_acc:   f64,
        eval_loss:   f64,
        eval_acc:    f64,
        global_step: u64,
    ) -> Self {
        Self { epoch, train_loss, train_acc, eval_loss, eval_acc, global_step }
    }

    /// Returns true if this epoch improved over the previous best eval_loss
    pub fn is_improvement(&self, best_eval_loss: f64) -> bool {
        self.eval_loss < best_eval_loss
    }
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet, so
    /// repeated runs append to one log.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{}",
            m.epoch,
            m.train_loss,
            m.train_acc,
            m.eval_loss,
            m.eval_acc,
            m.global_step,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, eval_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.eval_loss,
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
        let m = EpochMetrics::new(2, 9.1, 0.0, 9.0, 0.0, 8);
        assert!(m.is_improvement(9.5));
        assert!(!m.is_improvement(8.5));
    }

    #[test]
    fn test_header_written_once_and_rows_appended() {
        let dir = tempfile::tempdir().unwrap();

        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 9.0, 0.25, 8.5, 0.5, 4)).unwrap();
        // a second logger on the same directory must not rewrite the header
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(2, 8.0, 0.5, 7.5, 0.75, 8)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec![
            CSV_HEADER,
            "1,9.000000,0.250000,8.500000,0.500000,4",
            "2,8.000000,0.500000,7.500000,0.750000,8",
        ]);
    }
}
