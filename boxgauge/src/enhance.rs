// Region enhancement module
// Contrast-normalizes a detection crop before segmentation

use anyhow::Result;
use opencv::{
    core::{self, Mat, Size, Vector},
    imgproc,
    prelude::*,
};

/// CLAHE clip limit applied to the luminance channel
const CLAHE_CLIP_LIMIT: f64 = 3.0;
/// CLAHE tile grid is CLAHE_TILE_GRID x CLAHE_TILE_GRID
const CLAHE_TILE_GRID: i32 = 8;

/// Enhance local contrast of a BGR region prior to binarization.
///
/// The crop is converted to CIE L*a*b*, contrast-limited adaptive histogram
/// equalization is applied to the L channel only, and the result is
/// converted back to BGR. Equalizing luminance while leaving chrominance
/// untouched improves segmentation contrast under uneven illumination
/// without introducing color artifacts. Output matches the input in size
/// and channel count. The input must be non-empty; the caller guards
/// against zero-area crops.
pub fn enhance_region(roi: &Mat) -> Result<Mat> {
    let mut lab = Mat::default();
    imgproc::cvt_color(
        roi,
        &mut lab,
        imgproc::COLOR_BGR2Lab,
        0,
    )?;

    let mut channels: Vector<Mat> = Vector::new();
    core::split(&lab, &mut channels)?;

    let mut clahe = imgproc::create_clahe(
        CLAHE_CLIP_LIMIT,
        Size::new(CLAHE_TILE_GRID, CLAHE_TILE_GRID),
    )?;
    let mut equalized = Mat::default();
    clahe.apply(&channels.get(0)?, &mut equalized)?;
    channels.set(0, equalized)?;

    let mut merged = Mat::default();
    core::merge(&channels, &mut merged)?;

    let mut enhanced = Mat::default();
    imgproc::cvt_color(
        &merged,
        &mut enhanced,
        imgproc::COLOR_Lab2BGR,
        0,
    )?;
    Ok(enhanced)
}
