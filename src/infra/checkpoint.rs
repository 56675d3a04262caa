// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves per-fold model weights and the run configuration.
//
// What gets saved per run:
//   1. Model weights (.mpk.gz per fold) — all learned parameters
//   2. train_config.json               — the full run configuration
//
// Why save the config?
//   The results CSV alone doesn't say how it was produced.
//   The JSON records antibiotic, k-mer order, fold count,
//   epochs, seed — everything needed to reproduce the run.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if architecture doesn't match
//
// File naming convention:
//   runs/
//     model_fold_0.mpk.gz   ← weights after fold 0 finished
//     model_fold_1.mpk.gz   ← weights after fold 1 finished
//     ...
//     train_config.json     ← run configuration
//
// Reference: Burn Book §5 (Records and Checkpointing)

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::ResistanceCnn;

/// Manages saving of model checkpoints and run config.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        // create_dir_all creates parent directories too, like `mkdir -p`
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save one fold's final model weights.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &ResistanceCnn<B>,
        fold: usize,
    ) -> Result<()> {
        // Build the file path (without extension — recorder adds it)
        let path = self.dir.join(format!("model_fold_{fold}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint for fold {}", fold);
        Ok(())
    }

    /// Save the run configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");

        // serde_json::to_string_pretty adds indentation for readability
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }
}
