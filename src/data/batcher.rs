// ============================================================
// Layer 4 — K-mer Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<KmerSample>
// into backend-ready tensors.
//
// How batching works here:
//   Input:  Vec of N KmerSamples, each a vector of length 4^k
//   Output: KmerBatch with a [N, 4^k] float tensor and a [N]
//           target tensor
//
//   We flatten all vectors into one long Vec, then reshape:
//   [s1_v1, ..., s1_vD, s2_v1, ..., sN_vD] → [N, D]
//
// Why is this easy here?
//   Every vector in one run has the same length because k is
//   fixed for the whole cross-validation — no padding needed.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::KmerSample;

// ─── KmerBatch ────────────────────────────────────────────────────────────────
/// A batch of k-mer samples ready for the model forward pass.
///
/// B is the Burn Backend (e.g. NdArray, Wgpu) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct KmerBatch<B: Backend> {
    /// K-mer frequency vectors — shape: [batch_size, 4^k]
    pub vectors: Tensor<B, 2>,

    /// Regression targets (0.0 or 1.0) — shape: [batch_size]
    pub targets: Tensor<B, 1>,
}

// ─── KmerBatcher ──────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created on the correct backend.
#[derive(Clone, Debug)]
pub struct KmerBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> KmerBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<KmerSample, KmerBatch<B>> for KmerBatcher<B> {
    /// Convert a Vec of KmerSamples into a single KmerBatch.
    fn batch(&self, items: Vec<KmerSample>) -> KmerBatch<B> {
        let batch_size = items.len();
        // All vectors share the same order k, hence the same length
        let dim = items[0].kmer.len();

        let flat: Vec<f32> = items.iter().flat_map(|s| s.kmer.iter().copied()).collect();
        let labels: Vec<f32> = items.iter().map(|s| s.label).collect();

        let vectors = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, dim]);
        let targets = Tensor::<B, 1>::from_floats(labels.as_slice(), &self.device);

        KmerBatch { vectors, targets }
    }
}
