// src/segmentation.rs - Grayscale image to binary mask

use image::GrayImage;
use imageproc::contrast::threshold;
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

use crate::config::Config;
use crate::mask::BinaryMask;

/// Threshold a grayscale image into a foreground mask.
///
/// Pixels brighter than `level` are foreground; with `invert` the darker ones are.
/// A non-zero `closing_radius` fills gaps up to that chessboard radius.
pub fn segment_image(image: &GrayImage, level: u8, invert: bool, closing_radius: u8) -> BinaryMask {
    let mut source = image.clone();
    if invert {
        image::imageops::invert(&mut source);
    }

    let mut binary = threshold(&source, level);
    if closing_radius > 0 {
        binary = close(&binary, Norm::LInf, closing_radius);
    }

    BinaryMask::from_gray_image(&binary)
}

/// Segment with the mask settings from the configuration
pub fn segment_with_config(image: &GrayImage, config: &Config) -> BinaryMask {
    segment_image(image, config.threshold, config.invert, config.closing_radius)
}
