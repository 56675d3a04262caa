// ============================================================
// Layer 2 — FoldsUseCase
// ============================================================
// Dry-run companion to the training workflow: resolves the
// genome set and prints the deterministic fold table without
// touching a single CGR file.
//
// Useful before committing to a long run — it answers
// "which genomes made the cohort, how balanced are the
// folds?" in a second instead of an hour.

use anyhow::Result;

use crate::data::{file_label::FileLabel, loader::Loader};

/// One line of the fold preview.
pub struct FoldRow {
    pub genome_id: String,
    pub label: u8,
    pub fold: usize,
}

pub struct FoldsUseCase {
    label_file: String,
    data_dir: String,
    antibiotic: String,
    n_fold: usize,
}

impl FoldsUseCase {
    pub fn new(
        label_file: impl Into<String>,
        data_dir: impl Into<String>,
        antibiotic: impl Into<String>,
        n_fold: usize,
    ) -> Self {
        Self {
            label_file: label_file.into(),
            data_dir: data_dir.into(),
            antibiotic: antibiotic.into(),
            n_fold,
        }
    }

    /// Resolve labels, assign folds and return the table —
    /// exactly the assignment a training run would use.
    pub fn execute(&self) -> Result<Vec<FoldRow>> {
        let file_label = FileLabel::new(&self.label_file, &self.data_dir, &self.antibiotic)?;
        let loader = Loader::new(&file_label, self.n_fold)?;

        let rows = loader
            .genomes()
            .iter()
            .zip(loader.fold_assignment())
            .map(|(genome, &fold)| FoldRow {
                genome_id: genome.genome_id.clone(),
                label: genome.label,
                fold,
            })
            .collect();
        Ok(rows)
    }
}
