// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Key Burn insight:
//   - Training uses an AutodiffBackend for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - Validation batcher must also use B::InnerBackend
//   - Loss is BCE on logits, accuracy uses the sigmoid score
//     thresholded exactly like a prediction
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::domain::evaluation::BinaryConfusion;
use crate::infra::metrics::{EpochMetrics, MetricsLogger, TrainingHistory};
use crate::ml::model::SignalCnn;
use crate::ml::tensor_to_scores;

/// Train a fresh model for `cfg.epochs` epochs.
/// Returns the trained model (without autodiff) and the per-epoch history.
pub fn train<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    logger:        &MetricsLogger,
    device:        &B::Device,
) -> Result<(SignalCnn<B::InnerBackend>, TrainingHistory)> {
    if train_dataset.sample_count() == 0 {
        bail!("Training share is empty; add more images or lower the batch size");
    }

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config();
    let mut model: SignalCnn<B> = model_cfg.init(device);
    tracing::info!(
        "Model ready: input {}x{}, {} flattened features",
        model_cfg.image_size, model_cfg.image_size, model_cfg.flat_features()
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(cfg.image_size))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .set_device(device.clone())
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_samples = val_dataset.sample_count();
    if val_samples == 0 {
        tracing::warn!("Validation share is empty; val_loss will be NaN");
    }
    let val_loader = DataLoaderBuilder::new(ImageBatcher::<B::InnerBackend>::new(cfg.image_size))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .set_device(device.clone())
        .build(val_dataset);

    let mut history = TrainingHistory::default();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;
        let mut train_counts   = BinaryConfusion::new();

        for batch in train_loader.iter() {
            let (loss, probs) = model.forward_loss(batch.images, batch.targets);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;
            train_counts.update(&batch.labels, &tensor_to_scores(probs)?, cfg.threshold);

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = mean(train_loss_sum, train_batches);

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        let mut val_counts   = BinaryConfusion::new();

        if val_samples > 0 {
            for batch in val_loader.iter() {
                let (loss, probs) = model_valid.forward_loss(batch.images, batch.targets);

                val_loss_sum += loss.into_scalar().elem::<f64>();
                val_batches  += 1;
                val_counts.update(&batch.labels, &tensor_to_scores(probs)?, cfg.threshold);
            }
        }

        let metrics = EpochMetrics::new(
            epoch,
            train_loss,
            train_counts.accuracy(),
            mean(val_loss_sum, val_batches),
            val_counts.accuracy(),
        );

        println!(
            "Epoch {:>3}/{} | loss={:.4} | accuracy={:.1}% | val_loss={:.4} | val_accuracy={:.1}%",
            epoch, cfg.epochs, metrics.train_loss, metrics.train_acc * 100.0,
            metrics.val_loss, metrics.val_acc * 100.0,
        );
        tracing::debug!("Epoch {} done: {:?}", epoch, metrics);

        logger.log(&metrics)?;
        history.push(metrics);
    }

    if let Some(best) = history.best_epoch() {
        tracing::info!("Best validation accuracy {:.3} at epoch {}", best.val_acc, best.epoch);
    }
    tracing::info!("Training complete! Metrics in '{}'", logger.csv_path().display());

    Ok((model.valid(), history))
}

/// Average over batches; NaN when there were none (empty validation share).
fn mean(sum: f64, batches: usize) -> f64 {
    if batches > 0 { sum / batches as f64 } else { f64::NAN }
}
