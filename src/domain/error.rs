// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every failure in this system is a deterministic function
// of its inputs, so there are exactly two categories:
//
//   Configuration — the user asked for something impossible
//                   (unknown antibiotic, fold count out of
//                   range, zero workers). Surfaced before any
//                   heavy computation starts.
//
//   DataIntegrity — the inputs on disk are inconsistent
//                   (labelled genome without a file, a file
//                   that is not a valid CGR matrix). Applied
//                   uniformly: the run fails, it never skips
//                   a genome silently.
//
// No retries anywhere — retrying a deterministic failure
// would only mask a data problem. Callers propagate these
// through anyhow and tests downcast to assert the category.
//
// Reference: Rust Book §9 (Error Handling)

use thiserror::Error;

/// The two failure categories of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid CLI/config value — fatal before heavy work starts
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Inconsistent input data — fatal, never skipped per genome
    #[error("data integrity error: {0}")]
    DataIntegrity(String),
}

impl PipelineError {
    /// Shorthand constructor for configuration failures
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Shorthand constructor for data-integrity failures
    pub fn data(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }
}
