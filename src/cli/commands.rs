// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `folds`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Range rules that clap can't express (n_fold ≥ 2, fold count
// vs genome count) are enforced by the application layer so
// they surface as Configuration errors either way.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run k-fold cross-validation and write per-genome predictions
    Train(TrainArgs),

    /// Preview the deterministic fold assignment for an antibiotic
    Folds(FoldsArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Antibiotic to select from the label table
    #[arg(long)]
    pub antibiotic: String,

    /// CSV label table (genome_id, antibiotic, resistant_phenotype)
    #[arg(long)]
    pub label_file: String,

    /// Directory with one CGR matrix file per genome
    #[arg(long)]
    pub data_dir: String,

    /// Directory for results, metrics and checkpoints
    #[arg(long, default_value = "runs")]
    pub out_dir: String,

    /// K-mer order — the model input has length 4^k
    #[arg(long, default_value_t = 10)]
    pub kmer: u32,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 10)]
    pub folds: usize,

    /// Number of full passes through each fold's training data
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Worker threads for parallel genome encoding
    #[arg(long, default_value_t = 8)]
    pub workers: usize,

    /// Adam learning rate — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Seed for weight init and train-batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            label_file: a.label_file,
            data_dir: a.data_dir,
            antibiotic: a.antibiotic,
            out_dir: a.out_dir,
            kmer: a.kmer,
            batch_size: a.batch_size,
            n_fold: a.folds,
            epochs: a.epochs,
            workers: a.workers,
            lr: a.lr,
            seed: a.seed,
        }
    }
}

/// All arguments for the `folds` command
#[derive(Args, Debug)]
pub struct FoldsArgs {
    /// Antibiotic to select from the label table
    #[arg(long)]
    pub antibiotic: String,

    /// CSV label table (genome_id, antibiotic, resistant_phenotype)
    #[arg(long)]
    pub label_file: String,

    /// Directory with one CGR matrix file per genome
    #[arg(long)]
    pub data_dir: String,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 10)]
    pub folds: usize,
}
