// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Turns a decoded image into the exact input the network sees.
// Used by BOTH the dataset builder and inference, so a single
// image is always prepared the same way:
//
//   1. Convert to 8-bit RGB (drops alpha, expands greyscale)
//   2. Resize to image_size × image_size (bilinear)
//   3. Rescale every channel value from [0, 255] to [0, 1]
//   4. Reorder HWC → CHW, which is what Burn's Conv2d expects
//
// Steps 1-2 happen once when the dataset is built (samples are
// kept as compact u8 pixels). Steps 3-4 happen per batch.

use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, ImageReader, RgbImage};

/// Largest 8-bit channel value.
pub const MAX_PIXEL: f32 = 255.0;

/// Number of colour channels fed to the network.
pub const CHANNELS: usize = 3;

/// Map one channel value from [0, 255] to [0, 1].
pub fn rescale(value: u8) -> f32 {
    value as f32 / MAX_PIXEL
}

/// Convert interleaved RGB bytes (HWC) into rescaled planar floats (CHW).
///
/// Example for a 1×2 image:
///   [r0 g0 b0 r1 g1 b1] → [r0 r1 | g0 g1 | b0 b1] / 255
pub fn hwc_to_chw(pixels: &[u8]) -> Vec<f32> {
    let plane   = pixels.len() / CHANNELS;
    let mut out = vec![0.0f32; plane * CHANNELS];

    for (i, px) in pixels.chunks_exact(CHANNELS).enumerate() {
        for (c, &v) in px.iter().enumerate() {
            out[c * plane + i] = rescale(v);
        }
    }

    out
}

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    image_size: u32,
}

impl Preprocessor {
    pub fn new(image_size: usize) -> Self {
        Self { image_size: image_size as u32 }
    }

    pub fn image_size(&self) -> usize {
        self.image_size as usize
    }

    /// Steps 1-2: RGB conversion and bilinear resize.
    pub fn prepare(&self, img: &DynamicImage) -> RgbImage {
        let rgb  = img.to_rgb8();
        let side = self.image_size;

        if rgb.dimensions() == (side, side) {
            return rgb;
        }
        image::imageops::resize(&rgb, side, side, FilterType::Triangle)
    }

    /// Decode a file; the format is sniffed from content, not extension.
    pub fn decode(path: &Path) -> Result<DynamicImage> {
        ImageReader::open(path)
            .with_context(|| format!("Cannot open image '{}'", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Cannot read image '{}'", path.display()))?
            .decode()
            .with_context(|| format!("Cannot decode image '{}'", path.display()))
    }

    pub fn load(&self, path: &Path) -> Result<RgbImage> {
        Ok(self.prepare(&Self::decode(path)?))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbaImage, Rgba};

    #[test]
    fn test_rescale_is_exact_division() {
        for v in 0..=255u8 {
            let r = rescale(v);
            assert_eq!(r, v as f32 / 255.0);
            assert!((0.0..=1.0).contains(&r));
        }
        assert_eq!(rescale(0),   0.0);
        assert_eq!(rescale(255), 1.0);
    }

    #[test]
    fn test_hwc_to_chw_layout() {
        // Two pixels: (255, 0, 51) and (0, 102, 255)
        let out = hwc_to_chw(&[255, 0, 51, 0, 102, 255]);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], 1.0);           // r0
        assert_eq!(out[1], 0.0);           // r1
        assert_eq!(out[2], 0.0);           // g0
        assert_eq!(out[3], 102.0 / 255.0); // g1
        assert_eq!(out[4], 51.0 / 255.0);  // b0
        assert_eq!(out[5], 1.0);           // b1
    }

    #[test]
    fn test_prepare_resizes_and_drops_alpha() {
        let rgba = RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 128]));
        let p    = Preprocessor::new(16);
        let out  = p.prepare(&DynamicImage::ImageRgba8(rgba));

        assert_eq!(out.dimensions(), (16, 16));
        // Flat colour survives bilinear resizing unchanged
        assert_eq!(*out.get_pixel(7, 7), Rgb([10, 20, 30]));
    }

    #[test]
    fn test_prepare_keeps_correct_size() {
        let rgb = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let out = Preprocessor::new(8).prepare(&DynamicImage::ImageRgb8(rgb.clone()));
        assert_eq!(out, rgb);
    }

    #[test]
    fn test_load_sniffs_content_not_extension() {
        let dir  = tempfile::tempdir().unwrap();
        // PNG bytes behind a .jpg name
        let path = dir.path().join("mislabelled.jpg");
        RgbImage::from_pixel(4, 4, Rgb([200, 0, 0]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        let img = Preprocessor::new(4).load(&path).unwrap();
        assert_eq!(*img.get_pixel(0, 0), Rgb([200, 0, 0]));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let p = Preprocessor::new(4);
        assert!(p.load(Path::new("/definitely/not/here.png")).is_err());
    }
}
