//! Test fixtures: small generated image trees on disk.

use std::{fs, path::Path};

use image::{ImageFormat, Rgb, RgbImage};

/// Write a flat-colour square image in the given format.
pub fn write_image(path: &Path, color: [u8; 3], size: u32, format: ImageFormat) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(size, size, Rgb(color))
        .save_with_format(path, format)
        .unwrap();
}

/// Write `<root>/<class>/img_<i>.png` for each (class, colour, count).
pub fn write_class_tree(root: &Path, classes: &[(&str, [u8; 3], usize)], size: u32) {
    for &(class, color, count) in classes {
        for i in 0..count {
            let path = root.join(class).join(format!("img_{i}.png"));
            write_image(&path, color, size, ImageFormat::Png);
        }
    }
}
