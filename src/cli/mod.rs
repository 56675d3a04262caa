// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train` — runs the full k-fold cross-validation and
//                writes the per-genome results CSV
//   2. `folds` — previews the deterministic fold assignment
//                without reading any genome files
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, FoldsArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "cgr-resist",
    version = "0.1.0",
    about = "Predict antibiotic resistance from CGR genome images with a cross-validated CNN."
)]
pub struct Cli {
    /// The subcommand to run (train or folds)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => Self::run_train(args),
            Commands::Folds(args) => Self::run_folds(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting cross-validation for '{}'", args.antibiotic);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        let results_path = use_case.execute()?;

        println!("Run complete. Results written to {}", results_path.display());
        Ok(())
    }

    /// Handles the `folds` subcommand.
    /// Prints the fold table and a per-fold summary.
    fn run_folds(args: FoldsArgs) -> Result<()> {
        use crate::application::folds_use_case::FoldsUseCase;

        let use_case = FoldsUseCase::new(
            args.label_file,
            args.data_dir,
            args.antibiotic,
            args.folds,
        );
        let rows = use_case.execute()?;

        println!("genome_id\tlabel\tfold");
        let mut sizes = vec![0usize; args.folds];
        for row in &rows {
            println!("{}\t{}\t{}", row.genome_id, row.label, row.fold);
            sizes[row.fold] += 1;
        }
        println!("\n{} genomes across {} folds: {:?}", rows.len(), args.folds, sizes);
        Ok(())
    }
}
