use burn::data::dataset::Dataset;

/// One decoded, resized training image.
/// Pixels are interleaved RGB (HWC) bytes of an image_size² image;
/// rescaling to [0, 1] happens in the batcher.
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub pixels: Vec<u8>,
    pub label:  usize,
}

pub struct ImageDataset {
    samples: Vec<ImageSample>,
}

impl ImageDataset {
    pub fn new(samples: Vec<ImageSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Number of samples per label, indexed by label.
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for s in &self.samples {
            if let Some(c) = counts.get_mut(s.label) {
                *c += 1;
            }
        }
        counts
    }
}

impl Dataset<ImageSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
