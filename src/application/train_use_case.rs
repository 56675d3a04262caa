// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full cross-validation pipeline in order:
//
//   Step 1: Validate configuration     (here — before any I/O)
//   Step 2: Resolve labels + files     (Layer 4 - data)
//   Step 3: Assign folds               (Layer 4 - data)
//   Step 4: Start compute session      (Layer 6 - infra)
//   Step 5: Save run config            (Layer 6 - infra)
//   Step 6: Train/evaluate every fold  (Layer 5 - ml)
//   Step 7: Write results CSV once     (Layer 6 - infra)
//
// Every genome appears in exactly one held-out fold, so the
// results table ends up with one row per genome — the driver
// asserts that instead of assuming it.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::CgrDataset,
    file_label::FileLabel,
    loader::Loader,
};
use crate::domain::error::PipelineError;
use crate::domain::traits::GenomeSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    results::ResultsWriter,
    session::ComputeSession,
};
use crate::ml::trainer::{train_fold, TrainBackend};

// ─── Training Configuration ──────────────────────────────────────────────────
// All parameters for one cross-validation run.
// Serialisable so the run can be reproduced from the JSON the
// checkpoint manager drops next to the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub label_file: String,
    pub data_dir: String,
    pub antibiotic: String,
    pub out_dir: String,
    pub kmer: u32,
    pub batch_size: usize,
    pub n_fold: usize,
    pub epochs: usize,
    pub workers: usize,
    pub lr: f64,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            label_file: "cgr_labels/cgr_label.csv".to_string(),
            data_dir: "cgr".to_string(),
            antibiotic: String::new(),
            out_dir: "runs".to_string(),
            kmer: 10,
            batch_size: 32,
            n_fold: 10,
            epochs: 100,
            workers: 8,
            lr: 1e-3,
            seed: 42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full cross-validation pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full run end to end and return the path of
    /// the results CSV.
    pub fn execute(&self) -> Result<std::path::PathBuf> {
        let cfg = &self.config;

        // ── Step 1: Validate configuration before any heavy work ──────────────
        validate_config(cfg)?;

        // ── Step 2: Resolve labels and files ──────────────────────────────────
        tracing::info!(
            "Resolving genomes for '{}' from '{}'",
            cfg.antibiotic,
            cfg.label_file
        );
        let file_label = FileLabel::new(&cfg.label_file, &cfg.data_dir, &cfg.antibiotic)?;
        let genome_count = file_label.genomes().len();

        // ── Step 3: Assign folds (computed once, immutable) ───────────────────
        let loader = Loader::new(&file_label, cfg.n_fold)?;

        // ── Step 4: Start the compute session ─────────────────────────────────
        let session = ComputeSession::start(cfg.workers)?;

        // ── Step 5: Save the run config for reproducibility ───────────────────
        let checkpoints = CheckpointManager::new(&cfg.out_dir);
        checkpoints.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.out_dir)?;

        // ── Step 6: Train and evaluate every fold ─────────────────────────────
        // Deterministic weight init and batch shuffling per run
        use burn::prelude::Backend;
        TrainBackend::seed(cfg.seed);

        let results_path =
            std::path::Path::new(&cfg.out_dir).join(format!("results_{}.csv", cfg.antibiotic));
        let mut results = ResultsWriter::new(&results_path, genome_count);

        session.run(|| -> Result<()> {
            for split in loader.get_kmer_dataset(cfg.kmer)? {
                let split = split?;
                tracing::info!(
                    "Fold {}: {} train / {} test genomes",
                    split.fold,
                    split.train_genome_ids.len(),
                    split.test_genome_ids.len()
                );

                let train_dataset = CgrDataset::from_train(&split);
                let test_dataset = CgrDataset::from_test(&split);

                let outcome = train_fold(
                    cfg,
                    split.fold,
                    train_dataset,
                    test_dataset,
                    &metrics,
                    &checkpoints,
                )?;

                tracing::info!(
                    "Fold {} finished: held-out MSE {:.4}",
                    split.fold,
                    outcome.test_loss
                );

                // Evaluation preserved dataset order, so scores zip
                // positionally against the held-out genome ids.
                debug_assert_eq!(outcome.predictions.len(), split.test_genome_ids.len());
                for ((genome_id, truth), pred) in split
                    .test_genome_ids
                    .into_iter()
                    .zip(split.test_labels)
                    .zip(outcome.predictions)
                {
                    results.push(genome_id, truth, pred);
                }
            }
            Ok(())
        })?;

        // ── Step 7: Write the results table exactly once ──────────────────────
        // One row per genome across all folds — anything else
        // means a fold contract was broken upstream.
        if results.len() != genome_count {
            return Err(PipelineError::data(format!(
                "expected {} result rows, got {}",
                genome_count,
                results.len()
            ))
            .into());
        }
        let path = results.finish()?;
        tracing::info!("Cross-validation complete for '{}'", cfg.antibiotic);
        Ok(path)
    }
}

/// Reject impossible configurations before any file I/O.
fn validate_config(cfg: &TrainConfig) -> Result<()> {
    if cfg.antibiotic.trim().is_empty() {
        return Err(PipelineError::config("antibiotic name must not be empty".to_string()).into());
    }
    if cfg.kmer == 0 {
        return Err(PipelineError::config("k-mer order must be at least 1".to_string()).into());
    }
    if cfg.batch_size == 0 {
        return Err(PipelineError::config("batch size must be at least 1".to_string()).into());
    }
    if cfg.epochs == 0 {
        return Err(PipelineError::config("epoch count must be at least 1".to_string()).into());
    }
    if cfg.n_fold < 2 {
        return Err(PipelineError::config(format!(
            "n_fold must be at least 2, got {}",
            cfg.n_fold
        ))
        .into());
    }
    if cfg.workers == 0 {
        return Err(PipelineError::config("worker count must be at least 1".to_string()).into());
    }
    if !(cfg.lr.is_finite() && cfg.lr > 0.0) {
        return Err(PipelineError::config(format!(
            "learning rate must be positive and finite, got {}",
            cfg.lr
        ))
        .into());
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> TrainConfig {
        TrainConfig {
            antibiotic: "tetracycline".to_string(),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_valid_config_accepted() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_empty_antibiotic_rejected() {
        let cfg = TrainConfig {
            antibiotic: "  ".to_string(),
            ..base_config()
        };
        let err = validate_config(&cfg).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Configuration(_)) => {}
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_valued_integers_rejected() {
        for cfg in [
            TrainConfig { kmer: 0, ..base_config() },
            TrainConfig { batch_size: 0, ..base_config() },
            TrainConfig { epochs: 0, ..base_config() },
            TrainConfig { n_fold: 1, ..base_config() },
            TrainConfig { workers: 0, ..base_config() },
        ] {
            assert!(validate_config(&cfg).is_err());
        }
    }

    #[test]
    fn test_nonpositive_lr_rejected() {
        let cfg = TrainConfig { lr: 0.0, ..base_config() };
        assert!(validate_config(&cfg).is_err());
    }
}
