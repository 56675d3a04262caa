// ============================================================
// Layer 4 — CGR Matrix Decoding
// ============================================================
// A chaos game representation (CGR) image is a square 2^K x 2^K
// grid of k-mer frequency counts: at full resolution every cell
// is the count of one distinct K-mer, and merging 2x2 blocks
// halves the order. That collapse is what lets one stored image
// serve every k-mer order k <= K:
//
//   order K   →  the matrix itself, flattened
//   order k<K →  sum each 2^(K-k) x 2^(K-k) block, flatten
//
// The flattened vector has length 4^k, the model input size.
//
// File format: headerless CSV, one matrix row per line.
// Decoding is pure — the same file at the same order always
// yields a bit-identical vector, so cross-validation results
// are reproducible across runs and machines.
//
// Anything that breaks the geometry (ragged rows, non-square,
// side not a power of two, order deeper than the image
// resolution) or the numbers themselves is a DataIntegrity
// failure naming the offending path.
//
// Reference: Jeffrey (1990) Chaos game representation of gene structure
//            Rust Book §9 (Error Handling)

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{s, Array2};

use crate::domain::error::PipelineError;

/// A decoded CGR image: a square count matrix whose side is a
/// power of two.
#[derive(Debug, Clone)]
pub struct CgrMatrix {
    counts: Array2<f32>,
    max_order: u32,
}

impl CgrMatrix {
    /// Decode one genome's CGR file.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // flexible(true) defers row-width checking to us, so a
        // ragged file surfaces as a DataIntegrity error naming
        // the row instead of a generic csv parse error.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("cannot open CGR file '{}'", path.display()))?;

        let mut values: Vec<f32> = Vec::new();
        let mut width: Option<usize> = None;
        let mut height = 0usize;

        for record in reader.records() {
            let record = record.with_context(|| {
                format!("cannot read CGR file '{}'", path.display())
            })?;

            match width {
                None => width = Some(record.len()),
                Some(w) if w != record.len() => {
                    return Err(PipelineError::data(format!(
                        "'{}': row {} has {} columns, expected {}",
                        path.display(),
                        height + 1,
                        record.len(),
                        w
                    ))
                    .into());
                }
                Some(_) => {}
            }

            for field in record.iter() {
                let value: f32 = field.trim().parse().map_err(|_| {
                    PipelineError::data(format!(
                        "'{}': '{}' is not a number",
                        path.display(),
                        field
                    ))
                })?;
                values.push(value);
            }
            height += 1;
        }

        let width = width.unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(
                PipelineError::data(format!("'{}': empty CGR matrix", path.display())).into(),
            );
        }
        if height != width {
            return Err(PipelineError::data(format!(
                "'{}': CGR matrix must be square, got {}x{}",
                path.display(),
                height,
                width
            ))
            .into());
        }
        if !height.is_power_of_two() {
            return Err(PipelineError::data(format!(
                "'{}': CGR side must be a power of two, got {}",
                path.display(),
                height
            ))
            .into());
        }

        let counts = Array2::from_shape_vec((height, width), values)
            .expect("dimensions were just validated");
        let max_order = height.trailing_zeros();

        Ok(Self { counts, max_order })
    }

    /// The deepest k-mer order this image can supply
    /// (log2 of the matrix side).
    pub fn max_order(&self) -> u32 {
        self.max_order
    }

    /// Derive the k-mer frequency vector of order `k`.
    ///
    /// Aggregates blocks by summation down to a 2^k x 2^k grid
    /// and flattens it row-major into a Vec of length 4^k.
    pub fn kmer_vector(&self, k: u32) -> Result<Vec<f32>> {
        if k == 0 {
            return Err(PipelineError::config("k-mer order must be at least 1".to_string()).into());
        }
        if k > self.max_order {
            return Err(PipelineError::data(format!(
                "CGR image of side {} cannot supply k-mer order {} (max {})",
                self.counts.nrows(),
                k,
                self.max_order
            ))
            .into());
        }

        let out_side = 1usize << k;
        let block = self.counts.nrows() / out_side;

        // At full resolution the matrix IS the vector — skip the
        // block walk and just flatten.
        if block == 1 {
            return Ok(self.counts.iter().copied().collect());
        }

        let mut vector = Vec::with_capacity(out_side * out_side);
        for bi in 0..out_side {
            for bj in 0..out_side {
                let sum = self
                    .counts
                    .slice(s![
                        bi * block..(bi + 1) * block,
                        bj * block..(bj + 1) * block
                    ])
                    .sum();
                vector.push(sum);
            }
        }
        Ok(vector)
    }
}

/// Decode `path` and derive its order-`k` vector in one step —
/// the per-genome unit of work the fold loader parallelises.
pub fn encode_cgr_file(path: impl AsRef<Path>, k: u32) -> Result<Vec<f32>> {
    CgrMatrix::from_csv(path)?.kmer_vector(k)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_matrix(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_full_resolution_flatten() {
        let (_dir, path) = write_matrix("1,2\n3,4\n");
        let m = CgrMatrix::from_csv(&path).unwrap();
        assert_eq!(m.max_order(), 1);
        assert_eq!(m.kmer_vector(1).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_block_aggregation_hand_computed() {
        // 4x4 image (K = 2) collapsed to order 1: each quadrant sums.
        let (_dir, path) = write_matrix("1,1,2,2\n1,1,2,2\n3,3,4,4\n3,3,4,4\n");
        let m = CgrMatrix::from_csv(&path).unwrap();
        assert_eq!(m.max_order(), 2);
        assert_eq!(m.kmer_vector(1).unwrap(), vec![4.0, 8.0, 12.0, 16.0]);
        // Full order is the identity flatten — 16 entries
        assert_eq!(m.kmer_vector(2).unwrap().len(), 16);
    }

    #[test]
    fn test_encoding_is_bit_identical_across_calls() {
        let (_dir, path) = write_matrix("0.5,1.25,2,3\n4,5,6,7\n8,9,10,11\n12,13,14,15\n");
        let a = encode_cgr_file(&path, 1).unwrap();
        let b = encode_cgr_file(&path, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let (_dir, path) = write_matrix("1,2\n3\n");
        let err = CgrMatrix::from_csv(&path).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::DataIntegrity(_)) => {}
            other => panic!("expected DataIntegrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_square_rejected() {
        let (_dir, path) = write_matrix("1,2\n3,4\n5,6\n");
        assert!(CgrMatrix::from_csv(&path).is_err());
    }

    #[test]
    fn test_non_power_of_two_side_rejected() {
        let (_dir, path) = write_matrix("1,2,3\n4,5,6\n7,8,9\n");
        assert!(CgrMatrix::from_csv(&path).is_err());
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let (_dir, path) = write_matrix("1,x\n3,4\n");
        let err = CgrMatrix::from_csv(&path).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::DataIntegrity(_)) => {}
            other => panic!("expected DataIntegrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_order_deeper_than_resolution_rejected() {
        let (_dir, path) = write_matrix("1,2\n3,4\n");
        let m = CgrMatrix::from_csv(&path).unwrap();
        let err = m.kmer_vector(5).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::DataIntegrity(_)) => {}
            other => panic!("expected DataIntegrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_order_zero_is_configuration_error() {
        let (_dir, path) = write_matrix("1,2\n3,4\n");
        let m = CgrMatrix::from_csv(&path).unwrap();
        let err = m.kmer_vector(0).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Configuration(_)) => {}
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }
}
