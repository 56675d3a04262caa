// ============================================================
// Layer 4 — K-mer Dataset
// ============================================================
// Implements Burn's Dataset trait over k-mer samples so the
// DataLoader can call .get(index) and .len().
//
// Order matters here: the evaluation loader iterates without
// shuffling, so sample order must match the genome-id order of
// the FoldSplit this dataset was built from — that alignment is
// what lets the driver zip predictions back to genome ids.

use burn::data::dataset::Dataset;

use crate::data::loader::FoldSplit;

/// One model-ready sample: a k-mer frequency vector and its
/// regression target (the 0/1 phenotype as a float).
#[derive(Debug, Clone)]
pub struct KmerSample {
    pub kmer: Vec<f32>,
    pub label: f32,
}

pub struct CgrDataset {
    samples: Vec<KmerSample>,
}

impl CgrDataset {
    pub fn new(samples: Vec<KmerSample>) -> Self {
        Self { samples }
    }

    /// The train portion of a fold split, order preserved.
    pub fn from_train(split: &FoldSplit) -> Self {
        Self::new(zip_samples(&split.train_kmers, &split.train_labels))
    }

    /// The held-out portion of a fold split, order preserved.
    pub fn from_test(split: &FoldSplit) -> Self {
        Self::new(zip_samples(&split.test_kmers, &split.test_labels))
    }
}

fn zip_samples(kmers: &[Vec<f32>], labels: &[f32]) -> Vec<KmerSample> {
    kmers
        .iter()
        .zip(labels)
        .map(|(kmer, &label)| KmerSample {
            kmer: kmer.clone(),
            label,
        })
        .collect()
}

impl Dataset<KmerSample> for CgrDataset {
    fn get(&self, index: usize) -> Option<KmerSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
