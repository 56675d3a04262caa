// ============================================================
// Layer 4 — Fold Loader
// ============================================================
// Turns an ordered genome set into a deterministic k-fold
// cross-validation generator.
//
// Fold assignment is stratified round-robin, with no shuffling:
//   - genomes are ranked within their label class in the
//     (already sorted) GenomeSource order
//   - fold = (rank + class offset) mod n_fold
//   - class 1 starts offset by count(class 0) mod n_fold, so
//     the per-class remainders land on different folds and
//     total fold sizes stay within one of each other
//
// Why round-robin instead of a seeded shuffle?
//   The genome order is already deterministic, so walking it
//   round-robin per class gives every fold the same class mix
//   (within ±1) with zero RNG — the assignment is bit-for-bit
//   reproducible across runs and process restarts by
//   construction, not by seed bookkeeping.
//
// The assignment is computed once in the constructor and is
// immutable for the lifetime of the Loader — repeated
// get_kmer_dataset calls always see the same folds.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Hastie et al. (2009) §7.10 (Cross-Validation)

use anyhow::Result;
use rayon::prelude::*;

use crate::data::cgr::encode_cgr_file;
use crate::domain::error::PipelineError;
use crate::domain::genome::LabeledGenome;
use crate::domain::traits::GenomeSource;

// ─── FoldSplit ────────────────────────────────────────────────────────────────
/// The (train, test) view for one held-out fold.
///
/// All six Vecs are index-aligned per side: entry i of
/// test_kmers, test_labels and test_genome_ids describe the
/// same genome. Train and test are disjoint and their union is
/// the full genome set.
pub struct FoldSplit {
    /// Which fold is held out (0-based)
    pub fold: usize,
    pub train_kmers: Vec<Vec<f32>>,
    pub test_kmers: Vec<Vec<f32>>,
    pub train_labels: Vec<f32>,
    pub test_labels: Vec<f32>,
    pub train_genome_ids: Vec<String>,
    pub test_genome_ids: Vec<String>,
}

// ─── Loader ───────────────────────────────────────────────────────────────────
/// Owns the genome set and its immutable fold assignment.
#[derive(Debug)]
pub struct Loader {
    genomes: Vec<LabeledGenome>,
    folds: Vec<usize>,
    n_fold: usize,
}

impl Loader {
    /// Assign every genome to a fold.
    ///
    /// Fails with a Configuration error when n_fold < 2 or when
    /// there are fewer genomes than folds — both before any
    /// genome file is touched.
    pub fn new<S: GenomeSource>(source: &S, n_fold: usize) -> Result<Self> {
        let genomes = source.genomes().to_vec();

        if n_fold < 2 {
            return Err(PipelineError::config(format!(
                "n_fold must be at least 2, got {n_fold}"
            ))
            .into());
        }
        if n_fold > genomes.len() {
            return Err(PipelineError::config(format!(
                "n_fold = {} exceeds the {} available genomes",
                n_fold,
                genomes.len()
            ))
            .into());
        }

        let folds = assign_stratified_folds(&genomes, n_fold);

        let mut sizes = vec![0usize; n_fold];
        for &f in &folds {
            sizes[f] += 1;
        }
        tracing::info!("Fold sizes: {:?}", sizes);

        Ok(Self {
            genomes,
            folds,
            n_fold,
        })
    }

    /// The fold each genome belongs to, index-aligned with
    /// `genomes()`. Stable for the lifetime of this Loader.
    pub fn fold_assignment(&self) -> &[usize] {
        &self.folds
    }

    pub fn genomes(&self) -> &[LabeledGenome] {
        &self.genomes
    }

    /// Produce the lazy sequence of n_fold (train, test) splits
    /// at k-mer order `k`.
    ///
    /// Genome files are decoded on the first `next()` call —
    /// each file exactly once, in parallel — and the vectors are
    /// cached for the remaining folds of this call, so a genome
    /// is never re-read for each of the n_fold − 1 folds it
    /// trains in. Calling this again restarts the sequence from
    /// fold 0 with identical contents.
    pub fn get_kmer_dataset(&self, k: u32) -> Result<KmerFolds<'_>> {
        if k == 0 {
            return Err(PipelineError::config("k-mer order must be at least 1".to_string()).into());
        }
        Ok(KmerFolds {
            loader: self,
            k,
            vectors: None,
            next_fold: 0,
        })
    }
}

/// Stratified round-robin fold assignment.
/// Class 1 is offset by count(class 0) mod n_fold so the
/// remainder folds of the two classes interleave.
fn assign_stratified_folds(genomes: &[LabeledGenome], n_fold: usize) -> Vec<usize> {
    let susceptible = genomes.iter().filter(|g| g.label == 0).count();
    let mut rank = [0usize, susceptible % n_fold];

    genomes
        .iter()
        .map(|g| {
            let class = usize::from(g.label);
            let fold = rank[class] % n_fold;
            rank[class] += 1;
            fold
        })
        .collect()
}

// ─── KmerFolds ────────────────────────────────────────────────────────────────
/// The lazy, finite, restartable fold sequence returned by
/// `get_kmer_dataset`. Yields n_fold FoldSplits, or a single
/// Err followed by None if any genome file fails to decode.
#[derive(Debug)]
pub struct KmerFolds<'a> {
    loader: &'a Loader,
    k: u32,
    /// Decoded k-mer vectors, index-aligned with the genome set.
    /// Populated on the first next() call.
    vectors: Option<Vec<Vec<f32>>>,
    next_fold: usize,
}

impl KmerFolds<'_> {
    /// Decode every genome file at order k, each exactly once.
    /// Runs on the current rayon pool, so wrapping the fold loop
    /// in ComputeSession::run scopes this to the configured
    /// worker count.
    fn encode_all(&self) -> Result<Vec<Vec<f32>>> {
        self.loader
            .genomes
            .par_iter()
            .map(|g| encode_cgr_file(&g.file_path, self.k))
            .collect()
    }

    fn build_split(&self, vectors: &[Vec<f32>], fold: usize) -> FoldSplit {
        let genomes = &self.loader.genomes;
        let folds = &self.loader.folds;

        let test_count = folds.iter().filter(|&&f| f == fold).count();
        let train_count = genomes.len() - test_count;

        let mut split = FoldSplit {
            fold,
            train_kmers: Vec::with_capacity(train_count),
            test_kmers: Vec::with_capacity(test_count),
            train_labels: Vec::with_capacity(train_count),
            test_labels: Vec::with_capacity(test_count),
            train_genome_ids: Vec::with_capacity(train_count),
            test_genome_ids: Vec::with_capacity(test_count),
        };

        for (i, genome) in genomes.iter().enumerate() {
            if folds[i] == fold {
                split.test_kmers.push(vectors[i].clone());
                split.test_labels.push(genome.target());
                split.test_genome_ids.push(genome.genome_id.clone());
            } else {
                split.train_kmers.push(vectors[i].clone());
                split.train_labels.push(genome.target());
                split.train_genome_ids.push(genome.genome_id.clone());
            }
        }
        split
    }
}

impl Iterator for KmerFolds<'_> {
    type Item = Result<FoldSplit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_fold >= self.loader.n_fold {
            return None;
        }

        if self.vectors.is_none() {
            match self.encode_all() {
                Ok(vectors) => self.vectors = Some(vectors),
                Err(e) => {
                    // A decode failure ends the sequence — no
                    // partial fold stream to mistake for a
                    // complete run.
                    self.next_fold = self.loader.n_fold;
                    return Some(Err(e));
                }
            }
        }

        let vectors = self.vectors.as_ref().expect("populated above");
        let split = self.build_split(vectors, self.next_fold);
        self.next_fold += 1;
        Some(Ok(split))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    /// In-memory GenomeSource — fold-assignment tests never
    /// touch the disk.
    struct StubSource {
        genomes: Vec<LabeledGenome>,
    }

    impl GenomeSource for StubSource {
        fn genomes(&self) -> &[LabeledGenome] {
            &self.genomes
        }
    }

    /// `labels[i]` becomes genome g{i:03} so the source order is
    /// the sorted order, matching the FileLabel contract.
    fn stub(labels: &[u8]) -> StubSource {
        let genomes = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| LabeledGenome::new(format!("g{i:03}"), format!("g{i:03}.csv"), label))
            .collect();
        StubSource { genomes }
    }

    fn mixed_labels(n: usize) -> Vec<u8> {
        // Deterministic 60/40 class mix
        (0..n).map(|i| u8::from(i % 5 < 2)).collect()
    }

    #[test]
    fn test_every_genome_in_exactly_one_fold() {
        let source = stub(&mixed_labels(100));
        let loader = Loader::new(&source, 5).unwrap();
        assert_eq!(loader.fold_assignment().len(), 100);
        assert!(loader.fold_assignment().iter().all(|&f| f < 5));
    }

    #[test]
    fn test_fold_sizes_within_one() {
        for n in [97usize, 100, 101, 103] {
            let source = stub(&mixed_labels(n));
            let loader = Loader::new(&source, 5).unwrap();

            let mut sizes = vec![0usize; 5];
            for &f in loader.fold_assignment() {
                sizes[f] += 1;
            }
            let min = *sizes.iter().min().unwrap();
            let max = *sizes.iter().max().unwrap();
            assert!(max - min <= 1, "{n} genomes → fold sizes {sizes:?}");
        }
    }

    #[test]
    fn test_exact_sizes_when_evenly_divisible() {
        let source = stub(&mixed_labels(100));
        let loader = Loader::new(&source, 5).unwrap();
        let mut sizes = vec![0usize; 5];
        for &f in loader.fold_assignment() {
            sizes[f] += 1;
        }
        assert_eq!(sizes, vec![20; 5]);
    }

    #[test]
    fn test_stratified_class_balance_within_one() {
        let source = stub(&mixed_labels(103));
        let loader = Loader::new(&source, 5).unwrap();

        for class in [0u8, 1] {
            let mut per_fold = vec![0usize; 5];
            for (i, g) in loader.genomes().iter().enumerate() {
                if g.label == class {
                    per_fold[loader.fold_assignment()[i]] += 1;
                }
            }
            let min = *per_fold.iter().min().unwrap();
            let max = *per_fold.iter().max().unwrap();
            assert!(max - min <= 1, "class {class} split {per_fold:?}");
        }
    }

    #[test]
    fn test_assignment_deterministic_across_instances() {
        let a = Loader::new(&stub(&mixed_labels(61)), 4).unwrap();
        let b = Loader::new(&stub(&mixed_labels(61)), 4).unwrap();
        assert_eq!(a.fold_assignment(), b.fold_assignment());
    }

    #[test]
    fn test_n_fold_below_two_is_configuration_error() {
        let err = Loader::new(&stub(&mixed_labels(10)), 1).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Configuration(_)) => {}
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_n_fold_exceeding_genomes_is_configuration_error() {
        let err = Loader::new(&stub(&mixed_labels(4)), 5).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Configuration(_)) => {}
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    /// On-disk fixture for the dataset-generator tests: n tiny
    /// 2x2 CGR files whose first cell is the genome index.
    fn disk_stub(n: usize) -> (tempfile::TempDir, StubSource) {
        let dir = tempfile::tempdir().unwrap();
        let genomes = (0..n)
            .map(|i| {
                let path = dir.path().join(format!("g{i:03}.csv"));
                fs::write(&path, format!("{i},0\n0,1\n")).unwrap();
                LabeledGenome::new(format!("g{i:03}"), path, u8::from(i % 2 == 0))
            })
            .collect();
        (dir, StubSource { genomes })
    }

    #[test]
    fn test_kmer_dataset_touches_every_genome_exactly_once_as_test() {
        let (_dir, source) = disk_stub(11);
        let loader = Loader::new(&source, 3).unwrap();

        let mut seen = Vec::new();
        let mut train_appearances = 0usize;
        for split in loader.get_kmer_dataset(1).unwrap() {
            let split = split.unwrap();
            assert_eq!(split.test_kmers.len(), split.test_genome_ids.len());
            assert_eq!(split.train_kmers.len(), split.train_genome_ids.len());
            assert_eq!(
                split.train_genome_ids.len() + split.test_genome_ids.len(),
                11
            );
            // Disjointness within the fold
            let test: HashSet<_> = split.test_genome_ids.iter().collect();
            assert!(split.train_genome_ids.iter().all(|id| !test.contains(id)));

            train_appearances += split.train_genome_ids.len();
            seen.extend(split.test_genome_ids);
        }

        // Union of test sets = full genome set, no duplicates
        assert_eq!(seen.len(), 11);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 11);
        // Each genome trains in exactly n_fold − 1 folds
        assert_eq!(train_appearances, 11 * 2);
    }

    #[test]
    fn test_kmer_dataset_is_restartable_and_identical() {
        let (_dir, source) = disk_stub(8);
        let loader = Loader::new(&source, 4).unwrap();

        let first: Vec<FoldSplit> = loader
            .get_kmer_dataset(1)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let second: Vec<FoldSplit> = loader
            .get_kmer_dataset(1)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(first.len(), 4);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.test_genome_ids, b.test_genome_ids);
            assert_eq!(a.test_kmers, b.test_kmers);
            assert_eq!(a.train_labels, b.train_labels);
        }
    }

    #[test]
    fn test_unreadable_genome_file_ends_the_sequence() {
        let (dir, source) = disk_stub(6);
        fs::write(dir.path().join("g002.csv"), "1,garbage\n0,1\n").unwrap();

        let loader = Loader::new(&source, 3).unwrap();
        let mut folds = loader.get_kmer_dataset(1).unwrap();

        let first = folds.next().unwrap();
        assert!(first.is_err());
        assert!(folds.next().is_none(), "sequence must end after an error");
    }

    #[test]
    fn test_order_zero_rejected_before_any_io() {
        let source = stub(&mixed_labels(6));
        let loader = Loader::new(&source, 3).unwrap();
        // Stub paths do not exist — an I/O attempt would error
        // differently, so reaching Configuration proves no file
        // was touched.
        let err = loader.get_kmer_dataset(0).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::Configuration(_)) => {}
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }
}
