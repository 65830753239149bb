//! Image decoding and binarization.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP), converts them to a
//! single-channel luma image, and thresholds that image to exactly two
//! values so every pixel is unambiguously a wall (0) or a corridor (255).

use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};

use crate::types::PipelineError;

/// Decode raw image bytes and convert to 8-bit luma.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded grayscale image"]
pub fn decode(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// Threshold a luma image: values strictly above `level` become 255,
/// everything else 0.
#[must_use = "returns the binarized image"]
pub fn binarize(gray: &GrayImage, level: u8) -> GrayImage {
    threshold(gray, level, ThresholdType::Binary)
}
