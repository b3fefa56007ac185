// Binarization module
// Produces a {0, 255} foreground mask by OR-combining a global and a local
// threshold, followed by morphological cleanup

use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Size, BORDER_CONSTANT, BORDER_DEFAULT},
    imgproc,
    prelude::*,
};

/// Gaussian pre-smoothing kernel edge
const BLUR_KERNEL: i32 = 5;
/// Neighborhood edge for the adaptive threshold
const ADAPTIVE_BLOCK_SIZE: i32 = 11;
/// Constant subtracted from the Gaussian-weighted neighborhood mean
const ADAPTIVE_OFFSET: f64 = 2.0;
/// Structuring element edge for closing and opening
const MORPH_KERNEL: i32 = 3;

/// Binarize an enhanced BGR region into a single-channel foreground mask.
///
/// Otsu's global threshold covers uniform backgrounds; the Gaussian-weighted
/// adaptive threshold covers local lighting gradients. A pixel is foreground
/// if either method marks it, so each method's failure mode is recovered by
/// the other at the cost of slightly looser boundaries. Closing fills small
/// gaps, then opening removes small specks. Degenerate masks (all-background
/// or all-foreground) are valid outputs; rejecting them is the contour
/// selector's job.
pub fn binary_mask(enhanced: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color(
        enhanced,
        &mut gray,
        imgproc::COLOR_BGR2GRAY,
        0,
    )?;

    let mut blurred = Mat::default();
    imgproc::gaussian_blur(
        &gray,
        &mut blurred,
        Size::new(BLUR_KERNEL, BLUR_KERNEL),
        0.0,
        0.0,
        BORDER_DEFAULT,
    )?;

    let mut global = Mat::default();
    imgproc::threshold(
        &blurred,
        &mut global,
        0.0,
        255.0,
        imgproc::THRESH_BINARY + imgproc::THRESH_OTSU,
    )?;

    let mut adaptive = Mat::default();
    imgproc::adaptive_threshold(
        &blurred,
        &mut adaptive,
        255.0,
        imgproc::ADAPTIVE_THRESH_GAUSSIAN_C,
        imgproc::THRESH_BINARY,
        ADAPTIVE_BLOCK_SIZE,
        ADAPTIVE_OFFSET,
    )?;

    // Union of both masks, not either one alone.
    let mut combined = Mat::default();
    core::bitwise_or(&global, &adaptive, &mut combined, &core::no_array())?;

    let kernel = imgproc::get_structuring_element(
        imgproc::MORPH_RECT,
        Size::new(MORPH_KERNEL, MORPH_KERNEL),
        Point::new(-1, -1),
    )?;

    let mut closed = Mat::default();
    imgproc::morphology_ex(
        &combined,
        &mut closed,
        imgproc::MORPH_CLOSE,
        &kernel,
        Point::new(-1, -1),
        1,
        BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;

    let mut opened = Mat::default();
    imgproc::morphology_ex(
        &closed,
        &mut opened,
        imgproc::MORPH_OPEN,
        &kernel,
        Point::new(-1, -1),
        1,
        BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;
    Ok(opened)
}
