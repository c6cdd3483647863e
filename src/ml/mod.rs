// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn model and everything that
// drives it: training, evaluation and inference.
//
// What's in this layer:
//
//   model.rs      — The convolutional classifier
//                   Conv(16) → Pool → Conv(32) → Pool →
//                   Conv(16) → Pool → Flatten →
//                   Dense(256, ReLU) → Dense(1) → Sigmoid
//
//   trainer.rs    — The training loop
//                   Forward pass, BCE loss, backward pass,
//                   Adam step, per-epoch validation + CSV row
//
//   evaluator.rs  — One pass over the test share, collecting
//                   precision / recall / binary accuracy
//
//   inferencer.rs — Scores a single image with a loaded model
//
// Backends:
//   Training uses Autodiff<Wgpu>; validation, evaluation and
//   inference run on the plain Wgpu backend (model.valid()).
//   With --cpu the same code runs on NdArray, which needs no
//   graphics adapter at all. Unit tests use NdArray too.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    prelude::*,
};

/// Convolutional signal / no-signal model
pub mod model;

/// Training loop with per-epoch validation and metrics logging
pub mod trainer;

/// Precision / recall / accuracy on the test share
pub mod evaluator;

/// Inference engine — scores one image with a trained model
pub mod inferencer;

pub type InferBackend = Wgpu;
pub type TrainBackend = Autodiff<InferBackend>;

pub type CpuInferBackend = NdArray;
pub type CpuTrainBackend = Autodiff<CpuInferBackend>;

pub fn gpu_device() -> WgpuDevice {
    let device = WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    device
}

pub fn cpu_device() -> NdArrayDevice {
    tracing::info!("Using NdArray CPU backend");
    NdArrayDevice::Cpu
}

/// Pull a [batch, 1] score tensor back to the host as a flat Vec.
pub fn tensor_to_scores<B: Backend>(scores: Tensor<B, 2>) -> Result<Vec<f32>> {
    scores
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read scores from device: {e:?}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_tensor_to_scores_flattens_column() {
        let device = Default::default();
        let t = Tensor::<NdArray, 1>::from_floats([0.1, 0.9, 0.5], &device).reshape([3, 1]);
        assert_eq!(tensor_to_scores(t).unwrap(), vec![0.1, 0.9, 0.5]);
    }
}
