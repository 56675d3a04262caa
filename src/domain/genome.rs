// ============================================================
// Layer 3 — LabeledGenome Domain Type
// ============================================================
// Represents a single genome usable for one antibiotic.
// This is a plain data struct with no behaviour —
// an identifier, the path of its CGR image, and the
// binary resistance phenotype.
//
// By the time a LabeledGenome exists, the label table has
// already been filtered to one antibiotic and joined against
// the data directory, so every instance is guaranteed to
// point at a file that was present at construction time.
//
// Reference: Rust Book §5 (Structs and Methods)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One genome with a recorded resistance phenotype.
///
/// Immutable once constructed by FileLabel — the fold loader
/// and the training driver only ever read these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledGenome {
    /// The genome identifier from the label table —
    /// also the stem of its file in the data directory
    pub genome_id: String,

    /// Path of the CGR matrix file for this genome
    pub file_path: PathBuf,

    /// Binary resistance phenotype: 1 = resistant, 0 = susceptible
    pub label: u8,
}

impl LabeledGenome {
    /// Create a new LabeledGenome.
    /// Uses impl Into so callers can pass &str or String —
    /// idiomatic Rust for flexible string arguments.
    pub fn new(genome_id: impl Into<String>, file_path: impl Into<PathBuf>, label: u8) -> Self {
        Self {
            genome_id: genome_id.into(),
            file_path: file_path.into(),
            label,
        }
    }

    /// The label as a float — the regression target the
    /// model actually trains against (labels stay 0/1 but
    /// the objective is squared error, not cross-entropy).
    pub fn target(&self) -> f32 {
        f32::from(self.label)
    }
}
