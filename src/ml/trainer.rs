// ============================================================
// Layer 5 — Per-Fold Training Loop
// ============================================================
// Full train + evaluation loop for one cross-validation fold
// using Burn's DataLoader and Adam.
//
// Backend split:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//   - The evaluation batcher must also use EvalBackend
//
// The evaluation loader never shuffles, so predictions come
// back in dataset order — the driver zips them against
// test_genome_ids positionally.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::KmerBatcher, dataset::CgrDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{ResistanceCnn, ResistanceCnnConfig};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
pub type EvalBackend = burn::backend::NdArray;

/// What one fold hands back to the driver: held-out scores in
/// dataset order plus the final evaluation loss.
pub struct FoldOutcome {
    pub predictions: Vec<f32>,
    pub test_loss: f64,
}

/// Train a fresh model on one fold's train split and evaluate
/// it on the held-out split.
pub fn train_fold(
    cfg: &TrainConfig,
    fold: usize,
    train_dataset: CgrDataset,
    test_dataset: CgrDataset,
    metrics: &MetricsLogger,
    checkpoints: &CheckpointManager,
) -> Result<FoldOutcome> {
    let device = burn::backend::ndarray::NdArrayDevice::default();

    // ── Build a fresh model per fold ──────────────────────────────────────────
    // Re-initialising per fold keeps folds independent — weights
    // never leak from one fold's training into another's test set.
    let model_cfg = ResistanceCnnConfig::new();
    let mut model: ResistanceCnn<TrainBackend> = model_cfg.init(&device);

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = KmerBatcher::<TrainBackend>::new(device);
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Evaluation data loader (inner backend, order-preserving) ──────────────
    let test_batcher = KmerBatcher::<EvalBackend>::new(device);
    let test_loader = DataLoaderBuilder::new(test_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(test_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_batches = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.vectors, batch.targets);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };

        // Cheap held-out loss each epoch for the learning curve;
        // predictions are only collected after the last epoch.
        let (test_loss, _) = evaluate(&model.valid(), &*test_loader);

        metrics.log(&EpochMetrics::new(fold, epoch, avg_train_loss, test_loss))?;

        println!(
            "Fold {} | Epoch {:>3}/{} | train_loss={:.4} | test_loss={:.4}",
            fold, epoch, cfg.epochs, avg_train_loss, test_loss,
        );
    }

    // ── Final evaluation — one score per held-out genome ──────────────────────
    let model_valid = model.valid();
    let (test_loss, predictions) = evaluate(&model_valid, &*test_loader);

    checkpoints.save_model(&model, fold)?;

    Ok(FoldOutcome {
        predictions,
        test_loss,
    })
}

/// Run the model over the held-out loader, returning the mean
/// MSE and the per-sample scores in loader order.
fn evaluate(
    model: &ResistanceCnn<EvalBackend>,
    loader: &dyn burn::data::dataloader::DataLoader<crate::data::batcher::KmerBatch<EvalBackend>>,
) -> (f64, Vec<f32>) {
    let mut loss_sum = 0.0f64;
    let mut batches = 0usize;
    let mut predictions = Vec::new();

    for batch in loader.iter() {
        let scores = model.forward(batch.vectors);

        let loss: f64 = MseLoss::new()
            .forward(scores.clone(), batch.targets, Reduction::Mean)
            .into_scalar()
            .elem::<f64>();
        loss_sum += loss;
        batches += 1;

        let values: Vec<f32> = scores.into_data().convert::<f32>().value;
        predictions.extend(values);
    }

    let avg = if batches > 0 {
        loss_sum / batches as f64
    } else {
        f64::NAN
    };
    (avg, predictions)
}
