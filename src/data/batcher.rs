// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks a Vec<ImageSample>
// into one tensor batch on the target device.
//
//   Input:  N samples, each image_size² RGB bytes (HWC)
//   Output: images  [N, 3, S, S]  float in [0, 1]
//           targets [N, 1]        int label (0 / 1)
//
// Rescaling (÷255) and the HWC → CHW reorder happen here, so
// samples stay compact u8 until they are actually batched.
//
// Reference: Burn Book §4 (Batcher)

use std::marker::PhantomData;

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ImageSample;
use crate::data::preprocessor::{hwc_to_chw, CHANNELS};

#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Rescaled images — shape: [batch_size, 3, S, S]
    pub images: Tensor<B, 4>,

    /// Labels as a column — shape: [batch_size, 1]
    /// Same shape as the model output, as the BCE loss expects
    pub targets: Tensor<B, 2, Int>,

    /// Host copy of the labels for metric counting
    pub labels: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ImageBatcher<B: Backend> {
    image_size: usize,
    _backend:   PhantomData<B>,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(image_size: usize) -> Self {
        Self { image_size, _backend: PhantomData }
    }
}

impl<B: Backend> Batcher<B, ImageSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageSample>, device: &B::Device) -> ImageBatch<B> {
        let batch_size = items.len();
        let side       = self.image_size;

        let mut pixels  = Vec::with_capacity(batch_size * CHANNELS * side * side);
        let mut targets = Vec::with_capacity(batch_size);
        let mut labels  = Vec::with_capacity(batch_size);

        for item in &items {
            pixels.extend(hwc_to_chw(&item.pixels));
            targets.push(item.label as i32);
            labels.push(item.label as u8);
        }

        // One host → device transfer for the whole batch
        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), device)
            .reshape([batch_size, CHANNELS, side, side]);

        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), device)
            .reshape([batch_size, 1]);

        ImageBatch { images, targets, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn sample(value: u8, label: usize, side: usize) -> ImageSample {
        ImageSample {
            pixels: vec![value; side * side * CHANNELS],
            label,
        }
    }

    #[test]
    fn test_batch_shapes() {
        let device  = Default::default();
        let batcher = ImageBatcher::<TestBackend>::new(4);
        let batch   = batcher.batch(vec![sample(0, 0, 4), sample(255, 1, 4), sample(51, 1, 4)], &device);

        assert_eq!(batch.images.dims(),  [3, 3, 4, 4]);
        assert_eq!(batch.targets.dims(), [3, 1]);
        assert_eq!(batch.labels, vec![0, 1, 1]);
    }

    #[test]
    fn test_batch_values_are_rescaled() {
        let device  = Default::default();
        let batcher = ImageBatcher::<TestBackend>::new(2);
        let batch   = batcher.batch(vec![sample(255, 1, 2), sample(51, 0, 2)], &device);

        let values: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(values[..12].iter().all(|&v| v == 1.0));
        assert!(values[12..].iter().all(|&v| v == 51.0 / 255.0));
    }
}
