// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw label table and
// CGR image files all the way to tensor-ready batches.
//
// The pipeline flows in this order:
//
//   label CSV + data directory
//       │
//       ▼
//   FileLabel         → filters by antibiotic, joins files,
//       │               emits ordered LabeledGenomes
//       ▼
//   Loader            → assigns stratified folds, decodes
//       │               each CGR matrix into a k-mer vector
//       ▼
//   FoldSplit         → (train, test) view for one held-out fold
//       │
//       ▼
//   CgrDataset        → implements Burn's Dataset trait
//       │
//       ▼
//   KmerBatcher       → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Resolves genome ids to labels and file paths for one antibiotic
pub mod file_label;

/// Decodes CGR matrix files and derives k-mer frequency vectors
pub mod cgr;

/// Stratified k-fold assignment and the per-fold dataset generator
pub mod loader;

/// Implements Burn's Dataset trait for k-mer samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
