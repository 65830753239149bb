//! Integer rescaling between source and working resolution.
//!
//! The search visits every reachable cell, so large scans are shrunk by
//! an integer factor before solving and the painted result is blown
//! back up by the same factor for export. Both directions use
//! nearest-neighbor sampling so no intermediate gray levels appear in a
//! binarized image.

use image::GrayImage;
use image::imageops::{FilterType, resize};

use crate::types::PipelineError;

/// Shrink `image` to `(width / factor, height / factor)` using
/// nearest-neighbor sampling.
///
/// Returns the (possibly unchanged) image and whether resizing was
/// actually applied. A factor of 1 returns the image unchanged.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `factor` is zero or if the
/// image is too small to shrink by `factor` (a dimension would become 0).
pub fn downsample(image: &GrayImage, factor: u32) -> Result<(GrayImage, bool), PipelineError> {
    if factor == 0 {
        return Err(PipelineError::InvalidConfig(
            "factor must be at least 1".to_string(),
        ));
    }
    if factor == 1 {
        return Ok((image.clone(), false));
    }

    let (w, h) = (image.width() / factor, image.height() / factor);
    if w == 0 || h == 0 {
        return Err(PipelineError::InvalidConfig(format!(
            "a {}x{} image is too small for factor {factor}",
            image.width(),
            image.height(),
        )));
    }

    Ok((resize(image, w, h, FilterType::Nearest), true))
}

/// Enlarge `image` by `factor` in both axes using nearest-neighbor
/// sampling, so each cell becomes a `factor × factor` block.
///
/// Factors of 0 and 1 return the image unchanged.
#[must_use]
pub fn upscale(image: &GrayImage, factor: u32) -> GrayImage {
    if factor <= 1 {
        return image.clone();
    }
    let w = image.width().saturating_mul(factor);
    let h = image.height().saturating_mul(factor);
    resize(image, w, h, FilterType::Nearest)
}
