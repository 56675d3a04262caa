// ============================================================
// Layer 4 — FileLabel
// ============================================================
// Produces the authoritative list of genomes usable for one
// antibiotic, with binary label and file path.
//
// How the join works:
//   1. Read the label CSV and keep only rows for the
//      requested antibiotic. Zero rows → Configuration error,
//      raised before the data directory is even opened.
//   2. List the data directory once, mapping file stem →
//      full path.
//   3. Join labelled rows against that map by genome id.
//      A labelled genome without a file is a hard
//      DataIntegrity failure — the fail-fast policy keeps
//      runs reproducible instead of silently shrinking the
//      cohort depending on what happens to be on disk.
//   4. Sort by genome id so the output order (and therefore
//      downstream fold assignment) is identical across runs.
//
// Expected label table columns (header-based, order free):
//   genome_id, antibiotic, resistant_phenotype (0 or 1)
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::error::PipelineError;
use crate::domain::genome::LabeledGenome;
use crate::domain::traits::GenomeSource;

/// One row of the label table as it appears on disk.
/// Deserialised by header name, so column order is free.
#[derive(Debug, Deserialize)]
struct LabelRow {
    genome_id: String,
    antibiotic: String,
    resistant_phenotype: u8,
}

/// The resolved genome set for one antibiotic.
/// Built once at construction; immutable afterwards.
#[derive(Debug)]
pub struct FileLabel {
    genomes: Vec<LabeledGenome>,
}

impl FileLabel {
    /// Read the label table, filter to `antibiotic`, join against
    /// the data directory and sort the result by genome id.
    pub fn new(
        label_file: impl AsRef<Path>,
        data_dir: impl AsRef<Path>,
        antibiotic: &str,
    ) -> Result<Self> {
        let label_file = label_file.as_ref();
        let data_dir = data_dir.as_ref();

        // ── Step 1: Filter the label table ────────────────────────────────────
        let rows = read_label_rows(label_file, antibiotic)?;
        if rows.is_empty() {
            return Err(PipelineError::config(format!(
                "antibiotic '{}' does not appear in label table '{}'",
                antibiotic,
                label_file.display()
            ))
            .into());
        }
        tracing::info!(
            "Label table: {} genomes labelled for '{}'",
            rows.len(),
            antibiotic
        );

        // ── Step 2: Index the data directory by file stem ─────────────────────
        let files = index_data_dir(data_dir)?;

        // ── Step 3: Join labels against files (fail-fast on misses) ───────────
        // BTreeMap iteration is already sorted by genome id, which
        // gives the deterministic output order for free.
        let mut genomes = Vec::with_capacity(rows.len());
        for (genome_id, label) in &rows {
            let path = files.get(genome_id).ok_or_else(|| {
                PipelineError::data(format!(
                    "genome '{}' is labelled for '{}' but has no file in '{}'",
                    genome_id,
                    antibiotic,
                    data_dir.display()
                ))
            })?;
            genomes.push(LabeledGenome::new(genome_id.clone(), path.clone(), *label));
        }

        let resistant = genomes.iter().filter(|g| g.label == 1).count();
        tracing::info!(
            "Joined {} genomes ({} resistant, {} susceptible)",
            genomes.len(),
            resistant,
            genomes.len() - resistant
        );

        Ok(Self { genomes })
    }
}

impl GenomeSource for FileLabel {
    fn genomes(&self) -> &[LabeledGenome] {
        &self.genomes
    }
}

/// Parse the label CSV and return (genome_id → label) for the
/// requested antibiotic, sorted by genome id.
///
/// A genome listed twice for the same antibiotic has no single
/// truth to train against, so duplicates are a DataIntegrity
/// failure rather than a silent last-row-wins.
fn read_label_rows(label_file: &Path, antibiotic: &str) -> Result<BTreeMap<String, u8>> {
    let mut reader = csv::Reader::from_path(label_file)
        .with_context(|| format!("cannot open label table '{}'", label_file.display()))?;

    let mut rows = BTreeMap::new();
    for record in reader.deserialize() {
        let row: LabelRow = record
            .with_context(|| format!("malformed row in label table '{}'", label_file.display()))?;
        if row.antibiotic != antibiotic {
            continue;
        }
        if row.resistant_phenotype > 1 {
            return Err(PipelineError::data(format!(
                "genome '{}': resistant_phenotype must be 0 or 1, got {}",
                row.genome_id, row.resistant_phenotype
            ))
            .into());
        }
        if rows.insert(row.genome_id.clone(), row.resistant_phenotype).is_some() {
            return Err(PipelineError::data(format!(
                "genome '{}' is labelled twice for antibiotic '{}'",
                row.genome_id, antibiotic
            ))
            .into());
        }
    }
    Ok(rows)
}

/// List the data directory once and map file stem → path.
/// Subdirectories and extension-less oddities are ignored —
/// only plain files participate in the join.
fn index_data_dir(data_dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut files = BTreeMap::new();
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("cannot read data directory '{}'", data_dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.insert(stem.to_string(), path);
        }
    }
    Ok(files)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Build a label table plus data files in a temp dir.
    /// `with_files` controls which genome ids get a matrix file.
    fn fixture(rows: &[(&str, &str, u8)], with_files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("cgr");
        fs::create_dir(&data_dir).unwrap();

        let mut f = fs::File::create(dir.path().join("labels.csv")).unwrap();
        writeln!(f, "genome_id,antibiotic,resistant_phenotype").unwrap();
        for (id, ab, label) in rows {
            writeln!(f, "{},{},{}", id, ab, label).unwrap();
        }
        for id in with_files {
            fs::write(data_dir.join(format!("{id}.csv")), "1,0\n0,1\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_filters_and_sorts_by_genome_id() {
        let dir = fixture(
            &[
                ("g2", "tetracycline", 1),
                ("g1", "tetracycline", 0),
                ("g3", "ampicillin", 1),
            ],
            &["g1", "g2", "g3"],
        );
        let fl = FileLabel::new(
            dir.path().join("labels.csv"),
            dir.path().join("cgr"),
            "tetracycline",
        )
        .unwrap();

        let ids: Vec<&str> = fl.genomes().iter().map(|g| g.genome_id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2"]);
        assert_eq!(fl.genomes()[0].label, 0);
        assert_eq!(fl.genomes()[1].label, 1);
    }

    #[test]
    fn test_unknown_antibiotic_is_configuration_error() {
        let dir = fixture(&[("g1", "tetracycline", 1)], &["g1"]);
        let err = FileLabel::new(
            dir.path().join("labels.csv"),
            dir.path().join("cgr"),
            "vancomycin",
        )
        .unwrap_err();

        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Configuration(_)) => {}
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_data_integrity_error() {
        // g2 is labelled but has no matrix file — hard fail
        let dir = fixture(
            &[("g1", "tetracycline", 1), ("g2", "tetracycline", 0)],
            &["g1"],
        );
        let err = FileLabel::new(
            dir.path().join("labels.csv"),
            dir.path().join("cgr"),
            "tetracycline",
        )
        .unwrap_err();

        let msg = format!("{err}");
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::DataIntegrity(_)) => {}
            other => panic!("expected DataIntegrity error, got {other:?}"),
        }
        assert!(msg.contains("g2"), "error should name the missing genome");
    }

    #[test]
    fn test_duplicate_label_row_is_data_integrity_error() {
        let dir = fixture(
            &[("g1", "tetracycline", 1), ("g1", "tetracycline", 0)],
            &["g1"],
        );
        let err = FileLabel::new(
            dir.path().join("labels.csv"),
            dir.path().join("cgr"),
            "tetracycline",
        )
        .unwrap_err();

        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::DataIntegrity(_)) => {}
            other => panic!("expected DataIntegrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_binary_phenotype_rejected() {
        let dir = fixture(&[("g1", "tetracycline", 2)], &["g1"]);
        let err = FileLabel::new(
            dir.path().join("labels.csv"),
            dir.path().join("cgr"),
            "tetracycline",
        )
        .unwrap_err();

        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::DataIntegrity(_)) => {}
            other => panic!("expected DataIntegrity error, got {other:?}"),
        }
    }
}
