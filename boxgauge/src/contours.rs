// Contour selection module
// Suppresses border-connected background in a binary mask, then extracts
// outer contours and filters them by area relative to the mask

use anyhow::Result;
use opencv::{
    core::{Mat, Point, Vector, CV_32S},
    imgproc::{self, CHAIN_APPROX_SIMPLE, RETR_EXTERNAL},
    prelude::*,
};

/// Default lower bound on contour area as a share of the mask area
pub const DEFAULT_MIN_AREA_RATIO: f64 = 0.1;

/// Zero out foreground components connected to the mask border.
///
/// A detector crop surrounds its object, so the silhouette is interior to
/// the crop and foreground touching the border is background. Uniform
/// background thresholds to solid foreground under the adaptive method
/// (every value exceeds its neighborhood mean minus the offset); that
/// artifact component always reaches the border, and left in place it walls
/// the silhouette off behind the single outermost contour.
fn suppress_border_background(mask: &Mat) -> Result<Mat> {
    let mut labels = Mat::default();
    let label_count = imgproc::connected_components(mask, &mut labels, 8, CV_32S)?;
    if label_count <= 1 {
        // no foreground at all
        return Ok(mask.try_clone()?);
    }

    let size = mask.size()?;
    let rows = size.height;
    let cols = size.width;
    let mut touches_border = vec![false; label_count as usize];
    for x in 0..cols {
        touches_border[*labels.at_2d::<i32>(0, x)? as usize] = true;
        touches_border[*labels.at_2d::<i32>(rows - 1, x)? as usize] = true;
    }
    for y in 0..rows {
        touches_border[*labels.at_2d::<i32>(y, 0)? as usize] = true;
        touches_border[*labels.at_2d::<i32>(y, cols - 1)? as usize] = true;
    }

    let mut cleaned = mask.try_clone()?;
    for y in 0..rows {
        for x in 0..cols {
            let label = *labels.at_2d::<i32>(y, x)? as usize;
            // label 0 is the zero-pixel background of the labeling itself
            if label != 0 && touches_border[label] {
                *cleaned.at_2d_mut::<u8>(y, x)? = 0;
            }
        }
    }
    Ok(cleaned)
}

/// Extract outer contours and keep those above the relative area bound.
///
/// Border-connected foreground is suppressed first, then only external
/// contours are traced, with collinear-run compression. A contour survives
/// when its enclosed area exceeds `min_area_ratio * mask_area`. An empty
/// result is an expected outcome for noisy or featureless regions, not a
/// fault.
pub fn select_contours(mask: &Mat, min_area_ratio: f64) -> Result<Vector<Vector<Point>>> {
    let cleaned = suppress_border_background(mask)?;

    let mut found: Vector<Vector<Point>> = Vector::new();
    imgproc::find_contours(
        &cleaned,
        &mut found,
        RETR_EXTERNAL,
        CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;

    let size = mask.size()?;
    let mask_area = f64::from(size.width) * f64::from(size.height);
    let min_area = min_area_ratio * mask_area;

    let mut kept: Vector<Vector<Point>> = Vector::new();
    for i in 0..found.len() {
        let contour = found.get(i)?;
        let area = imgproc::contour_area(&contour, false)?;
        if area > min_area {
            kept.push(contour);
        }
    }
    Ok(kept)
}

/// Pick the contour of maximum area, the dominant object silhouette.
/// `None` means no shape was found.
pub fn dominant_contour(contours: &Vector<Vector<Point>>) -> Result<Option<Vector<Point>>> {
    let mut best: Option<Vector<Point>> = None;
    let mut best_area = f64::MIN;
    for i in 0..contours.len() {
        let contour = contours.get(i)?;
        let area = imgproc::contour_area(&contour, false)?;
        if area > best_area {
            best_area = area;
            best = Some(contour);
        }
    }
    Ok(best)
}
