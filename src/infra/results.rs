// ============================================================
// Layer 6 — Results Writer
// ============================================================
// Accumulates per-genome predictions and writes the results
// table exactly once at the end of a successful run.
//
// The buffer is pre-sized to the genome count and rows are
// appended in memory as folds finish; nothing touches the
// output path until finish() is called. A run that fails
// mid-way therefore leaves no partial results file that could
// be mistaken for a complete one, and a successful run fully
// overwrites whatever a previous invocation left behind.
//
// Output columns: genome_id,true,pred — one row per genome,
// each genome appearing exactly once across all folds.
//
// Reference: Rust Book §9 (Error Handling)
//            csv crate documentation (serde serialisation)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// One prediction row: the genome, its recorded phenotype and
/// the model's (unbounded) score.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRow {
    pub genome_id: String,
    /// `true` is a Rust keyword — serde renames the column
    #[serde(rename = "true")]
    pub truth: f32,
    pub pred: f32,
}

/// In-memory results buffer with a single final flush.
pub struct ResultsWriter {
    path: PathBuf,
    rows: Vec<PredictionRow>,
}

impl ResultsWriter {
    /// `capacity` is the genome count — the buffer never
    /// reallocates during a run.
    pub fn new(path: impl AsRef<Path>, capacity: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, genome_id: impl Into<String>, truth: f32, pred: f32) {
        self.rows.push(PredictionRow {
            genome_id: genome_id.into(),
            truth,
            pred,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write all rows, overwriting any existing file, and
    /// return the output path.
    pub fn finish(self) -> Result<PathBuf> {
        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("cannot create results file '{}'", self.path.display()))?;

        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} predictions to '{}'", self.rows.len(), self.path.display());
        Ok(self.path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_rows_round_trip_with_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results_tetracycline.csv");

        let mut writer = ResultsWriter::new(&path, 2);
        writer.push("g1", 1.0, 0.83);
        writer.push("g2", 0.0, 0.12);
        assert_eq!(writer.len(), 2);
        writer.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "genome_id,true,pred");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("g1,1"));
    }

    #[test]
    fn test_finish_overwrites_previous_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let mut first = ResultsWriter::new(&path, 3);
        first.push("g1", 1.0, 0.9);
        first.push("g2", 0.0, 0.1);
        first.push("g3", 1.0, 0.7);
        first.finish().unwrap();

        let mut second = ResultsWriter::new(&path, 1);
        second.push("g9", 0.0, 0.4);
        second.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2, "old rows must not survive");
        assert!(content.contains("g9"));
        assert!(!content.contains("g1"));
    }

    #[test]
    fn test_nothing_written_before_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let mut writer = ResultsWriter::new(&path, 1);
        writer.push("g1", 1.0, 0.5);
        assert!(!path.exists(), "buffering must not touch the disk");
        writer.finish().unwrap();
        assert!(path.exists());
    }
}
