// ============================================================
// Layer 5 — Evaluator
// ============================================================
// One pass over the held-out test share. Scores every batch
// with the trained model and folds the results into binary
// confusion counts, from which precision, recall and accuracy
// are read at the end.

use anyhow::Result;
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::domain::evaluation::{BinaryConfusion, EvaluationSummary};
use crate::ml::model::SignalCnn;
use crate::ml::tensor_to_scores;

pub fn evaluate<B: Backend>(
    model:      &SignalCnn<B>,
    test:       ImageDataset,
    image_size: usize,
    batch_size: usize,
    threshold:  f32,
    device:     &B::Device,
) -> Result<EvaluationSummary> {
    let mut counts = BinaryConfusion::new();

    if test.sample_count() == 0 {
        tracing::warn!("Test share is empty; reporting zero metrics");
        return Ok(EvaluationSummary::from(&counts));
    }

    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(image_size))
        .batch_size(batch_size)
        .num_workers(1)
        .set_device(device.clone())
        .build(test);

    for batch in loader.iter() {
        let scores = tensor_to_scores(model.forward_probs(batch.images))?;
        counts.update(&batch.labels, &scores, threshold);
    }

    tracing::debug!("Test confusion counts: {:?}", counts);
    Ok(EvaluationSummary::from(&counts))
}
