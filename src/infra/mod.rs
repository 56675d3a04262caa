// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   session.rs    — Compute session lifecycle
//                   Owns the rayon worker pool with an
//                   explicit start/stop boundary instead of
//                   implicit global runtime state.
//
//   checkpoint.rs — Saving model weights and run config
//                   Uses Burn's CompactRecorder to serialise
//                   each fold's final model, and serde_json
//                   for the run configuration.
//
//   metrics.rs    — Training metrics logging
//                   Writes per-fold, per-epoch losses to a
//                   CSV file for later analysis and plotting.
//
//   results.rs    — Final predictions table
//                   Accumulates one row per genome in memory
//                   and writes the results CSV exactly once
//                   at the end of a successful run.
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations
//   - Keeps other layers focused on their core logic
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Worker-pool lifecycle for parallel encoding
pub mod session;

/// Model checkpoint and run-config saving
pub mod checkpoint;

/// Per-epoch training metrics CSV
pub mod metrics;

/// Per-genome prediction results CSV
pub mod results;
